use std::num::NonZeroU64;
use std::time::Duration;

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use url::Url;
use xrpl_codec::AccountId;

/// Deployment parameters for one relay path. Everything the pipeline talks
/// to is fixed here at startup; the algorithm itself carries no addresses.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Delay between attempts while waiting for an external system to
    /// converge.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Attempt ceiling for the hub routing stage, where a non-terminal
    /// response code may also mean a permanently invalid request. `None`
    /// retries forever.
    pub route_attempt_limit: Option<NonZeroU64>,
    pub hub: HubConfig,
    pub destination: DestinationConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HubConfig {
    pub binary: String,
    pub node: Url,
    pub chain_id: String,
    pub signer: String,
    pub keyring_dir: String,
    pub keyring_backend: String,
    pub gas: u64,
    pub gas_adjustment: f64,
    pub gas_prices: String,
    /// Name of the source ledger as registered with the hub router.
    pub source_chain: String,
    /// Name of the hub's own chain, used when re-routing the message to the
    /// token service.
    pub hub_chain: String,
    pub xrpl_gateway: String,
    pub axelarnet_gateway: String,
    pub multisig_prover: String,
    /// Token service account on the hub, the destination of the re-routed
    /// message.
    pub its_hub: String,
    /// The gateway's multisig account on the source ledger.
    pub xrpl_multisig: AccountId,
    /// Identifier of the ledger's native token in the token service.
    #[serde(with = "hex")]
    pub xrp_token_id: [u8; 32],
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DestinationConfig {
    pub rpc_url: Url,
    /// Name of the destination chain as registered with the hub router.
    pub chain_name: String,
    pub gateway: Address,
    pub interchain_token_service: Address,
    /// Gas ceiling for the application execute call.
    pub gas_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            route_attempt_limit: NonZeroU64::new(60),
            hub: HubConfig::default(),
            destination: DestinationConfig::default(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            binary: "axelard".to_string(),
            node: "http://devnet-amplifier.axelar.dev:26657".parse().unwrap(),
            chain_id: "devnet-amplifier".to_string(),
            signer: "wallet".to_string(),
            keyring_dir: ".axelar".to_string(),
            keyring_backend: "test".to_string(),
            gas: 20_000_000,
            gas_adjustment: 1.5,
            gas_prices: "0.00005uamplifier".to_string(),
            source_chain: "xrpl".to_string(),
            hub_chain: "axelarnet".to_string(),
            xrpl_gateway: "axelar13w698a6pjytxj6jzprs6pznaxhan3flhf76fr0nc7jg3udcsa07q9c7da3"
                .to_string(),
            axelarnet_gateway:
                "axelar1yvfcrdke7fasxfaxx2r706h7h85rnk3w68cc5f4fkmafz5j755ssl8h9p0".to_string(),
            multisig_prover:
                "axelar19pu8hfnwgc0vjhadmvmgz3w4d2g7d7qlg6jjky9y2mf8ea4vf4usj6ramg".to_string(),
            its_hub: "axelar10jzzmv5m7da7dn2xsfac0yqe7zamy34uedx3e28laq0p6f3f8dzqp649fp"
                .to_string(),
            xrpl_multisig: "rP9iHnCmJcVPtzCwYJjU1fryC2pEcVqDHv".parse().unwrap(),
            xrp_token_id: hex_32(
                "c2bb311dd03a93be4b74d3b4ab8612241c4dd1fd0232467c54a03b064f8583b6",
            ),
        }
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.xrplevm.org".parse().unwrap(),
            chain_name: "xrpl-evm-sidechain".to_string(),
            gateway: "0x48CF6E93C4C1b014F719Db2aeF049AA86A255fE2"
                .parse()
                .unwrap(),
            interchain_token_service: "0x43F2ccD4E27099b5F580895b44eAcC866e5F7Bb1"
                .parse()
                .unwrap(),
            gas_limit: 8_000_000,
        }
    }
}

fn hex_32(hex: &str) -> [u8; 32] {
    let mut buffer = [0u8; 32];
    hex::decode_to_slice(hex, &mut buffer).expect("valid token id");
    buffer
}
