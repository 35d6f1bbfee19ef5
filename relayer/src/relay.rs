//! The relay pipeline. Eight strictly sequential stages carry one payment
//! from the source ledger through the hub to the destination chain. Each
//! stage submits an idempotent request and polls until its terminal event,
//! so a crashed relay can be restarted from the beginning without harm.

use alloy_primitives::U256;
use error_stack::{Report, Result, ResultExt};
use ethers::types::H256;
use its_envelope::{RoutedTransfer, Transfer};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use xrpl_codec::{AccountId, TxHash, XRP_MAX_DROPS};

use crate::artifact::RelayRequest;
use crate::config::Config;
use crate::events::UnfurledEvent;
use crate::evm::{self, DestinationClient};
use crate::hub::{HubClient, TxResponse};
use crate::msg::{
    ConstructProof, CrossChainId, DropsAmount, Execute, ProofQuery, ProofQueryResponse,
    ProofStatus, RouteIncomingMessages, RouteMessages, RoutedMessage, UserMessage, VerifyMessages,
};
use crate::poll::{self, submit_until_terminal, Classification, PollPolicy};

const EVENT_ALREADY_VERIFIED: &str = "wasm-already_verified";
const EVENT_ALREADY_REJECTED: &str = "wasm-already_rejected";
const EVENT_MESSAGE_ROUTED: &str = "wasm-message_routed";
const EVENT_CONTRACT_CALLED: &str = "wasm-contract_called";
const EVENT_PROOF_UNDER_CONSTRUCTION: &str = "wasm-proof_under_construction";
const ATTRIBUTE_MULTISIG_SESSION_ID: &str = "multisig_session_id";

// A user payment is always the first event of its ledger transaction.
const SOURCE_LOG_INDEX: u64 = 0;

// drops carry 6 decimals, the destination token 18
const DROPS_TO_DESTINATION_EXPONENT: u64 = 12;

const EVM_ADDRESS_LENGTH: usize = 20;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source transaction hash is malformed")]
    MalformedTxHash,
    #[error("source address is malformed")]
    MalformedAddress,
    #[error("destination address is malformed")]
    MalformedDestinationAddress,
    #[error("amount {0} is outside the drops range of the source ledger")]
    AmountOutOfRange(String),
    #[error("payload is malformed")]
    MalformedPayload,
    #[error("payload hash is malformed")]
    MalformedPayloadHash,
    #[error("verification did not complete")]
    Verification,
    #[error("inbound routing did not complete")]
    InboundRouting,
    #[error("hub execution did not complete")]
    HubExecution,
    #[error("hub routing did not complete")]
    HubRouting,
    #[error("proof construction did not complete")]
    ProofConstruction,
    #[error("proof did not become available")]
    ProofFetch,
    #[error("destination gateway submission failed")]
    GatewaySubmission,
    #[error("destination application execution failed")]
    ApplicationExecution,
}

/// Drives one payment through the hub to the destination chain.
pub struct Relayer<H, D> {
    config: Config,
    hub: H,
    destination: D,
}

/// The request after input validation: addresses translated, amounts
/// bounds-checked, hex fields decoded. Everything after this point talks to
/// external systems.
#[derive(Debug)]
struct Prepared {
    user_message: UserMessage,
    tx_hash: TxHash,
    payload: String,
    payload_bytes: Vec<u8>,
    destination_address_bytes: Vec<u8>,
}

impl Prepared {
    fn from_request(request: &RelayRequest, config: &Config) -> Result<Self, Error> {
        let tx_hash: TxHash = request
            .tx_hash
            .parse::<TxHash>()
            .change_context(Error::MalformedTxHash)?;
        let source: AccountId = request
            .source_address
            .parse::<AccountId>()
            .change_context(Error::MalformedAddress)?;

        let destination_address_bytes = hex::decode(&request.destination_address)
            .change_context(Error::MalformedDestinationAddress)?;
        if destination_address_bytes.len() != EVM_ADDRESS_LENGTH {
            return Err(Report::new(Error::MalformedDestinationAddress));
        }

        let drops: u64 = request
            .amount
            .parse::<u64>()
            .change_context_lazy(|| Error::AmountOutOfRange(request.amount.clone()))?;
        if drops > XRP_MAX_DROPS {
            return Err(Report::new(Error::AmountOutOfRange(request.amount.clone())));
        }

        let payload_bytes =
            hex::decode(&request.payload).change_context(Error::MalformedPayload)?;
        let payload_hash =
            hex::decode(&request.payload_hash).change_context(Error::MalformedPayloadHash)?;
        if payload_hash.len() != 32 {
            return Err(Report::new(Error::MalformedPayloadHash));
        }

        Ok(Self {
            user_message: UserMessage {
                tx_id: tx_hash.as_bytes().to_vec(),
                source_address: source.as_bytes().to_vec(),
                destination_chain: config.destination.chain_name.clone(),
                destination_address: request.destination_address.clone(),
                amount: DropsAmount { drops },
                payload_hash: request.payload_hash.clone(),
            },
            tx_hash,
            payload: request.payload.clone(),
            payload_bytes,
            destination_address_bytes,
        })
    }
}

/// Converts a drops amount to the destination's 18-decimal representation.
fn scaled_amount(drops: u64) -> U256 {
    U256::from(drops)
        .saturating_mul(U256::from(10u64).pow(U256::from(DROPS_TO_DESTINATION_EXPONENT)))
}

fn to_json<T: Serialize>(msg: &T) -> serde_json::Value {
    serde_json::to_value(msg).expect("hub messages must be serializable")
}

impl<H, D> Relayer<H, D>
where
    H: HubClient,
    D: DestinationClient,
{
    pub fn new(config: Config, hub: H, destination: D) -> Self {
        Self {
            config,
            hub,
            destination,
        }
    }

    /// Carries the payment to completion. Returns the hash of the confirmed
    /// destination application transaction.
    pub async fn relay(&self, request: &RelayRequest) -> Result<H256, Error> {
        let prepared = Prepared::from_request(request, &self.config)?;
        let cc_id = CrossChainId::from_tx(
            &self.config.hub.source_chain,
            &prepared.tx_hash,
            SOURCE_LOG_INDEX,
        );

        self.verify(&prepared).await?;
        self.route_inbound(&prepared).await?;
        let unfurled = self.execute_hub_message(&prepared, &cc_id).await?;
        self.route_hub_message(&cc_id, &unfurled).await?;
        let session_id = self.construct_proof(&cc_id).await?;
        let execute_data = self.fetch_proof(session_id).await?;

        let gateway_tx = self.submit_execute_data(&execute_data).await?;
        info!(tx = ?gateway_tx, "execute data confirmed on the destination gateway");

        let application_tx = self.execute_application(&cc_id, &unfurled).await?;
        info!(tx = ?application_tx, "transfer executed on the destination application");

        Ok(application_tx)
    }

    fn policy(&self) -> PollPolicy {
        PollPolicy::unbounded(self.config.poll_interval)
    }

    fn route_policy(&self) -> PollPolicy {
        match self.config.route_attempt_limit {
            Some(max_attempts) => PollPolicy::bounded(self.config.poll_interval, max_attempts),
            None => self.policy(),
        }
    }

    async fn verify(&self, prepared: &Prepared) -> Result<(), Error> {
        let msg = to_json(&VerifyMessages::single(prepared.user_message.clone()));

        info!("submitting the message for verification");

        submit_until_terminal(
            || self.hub.execute(&self.config.hub.xrpl_gateway, msg.clone()),
            |tx: TxResponse| {
                Ok(if tx.find_event(EVENT_ALREADY_VERIFIED).is_some() {
                    Classification::Terminal(())
                } else if tx.find_event(EVENT_ALREADY_REJECTED).is_some() {
                    Classification::Rejected(
                        "the verification quorum rejected the message".to_string(),
                    )
                } else {
                    Classification::Pending("verification has not completed".to_string())
                })
            },
            self.policy(),
        )
        .await
        .change_context(Error::Verification)?;

        info!("message verified");
        Ok(())
    }

    async fn route_inbound(&self, prepared: &Prepared) -> Result<(), Error> {
        let msg = to_json(&RouteIncomingMessages::single(
            prepared.payload.clone(),
            prepared.user_message.clone(),
        ));

        info!("routing the verified message into the hub");

        submit_until_terminal(
            || self.hub.execute(&self.config.hub.xrpl_gateway, msg.clone()),
            |tx: TxResponse| {
                Ok(if tx.find_event(EVENT_MESSAGE_ROUTED).is_some() {
                    Classification::Terminal(())
                } else {
                    Classification::Pending("message has not been routed".to_string())
                })
            },
            self.policy(),
        )
        .await
        .change_context(Error::InboundRouting)?;

        info!("message routed");
        Ok(())
    }

    async fn execute_hub_message(
        &self,
        prepared: &Prepared,
        cc_id: &CrossChainId,
    ) -> Result<UnfurledEvent, Error> {
        let envelope = RoutedTransfer {
            remote_chain: self.config.destination.chain_name.clone(),
            transfer: Transfer {
                token_id: self.config.hub.xrp_token_id,
                source_address: prepared.user_message.source_address.clone(),
                destination_address: prepared.destination_address_bytes.clone(),
                amount: scaled_amount(prepared.user_message.amount.drops),
                data: prepared.payload_bytes.clone(),
            },
        }
        .abi_encode();

        let msg = to_json(&Execute::new(cc_id.clone(), hex::encode(envelope)));

        info!(message_id = %cc_id.message_id, "executing the transfer on the hub gateway");

        submit_until_terminal(
            || self.hub.execute(&self.config.hub.axelarnet_gateway, msg.clone()),
            |tx: TxResponse| match tx.find_event(EVENT_CONTRACT_CALLED) {
                Some(event) => UnfurledEvent::try_from(event)
                    .map(Classification::Terminal)
                    .change_context(poll::Error::Protocol),
                None => Ok(Classification::Pending(
                    "hub call has not been recorded".to_string(),
                )),
            },
            self.policy(),
        )
        .await
        .change_context(Error::HubExecution)
    }

    async fn route_hub_message(
        &self,
        cc_id: &CrossChainId,
        unfurled: &UnfurledEvent,
    ) -> Result<(), Error> {
        let msg = to_json(&RouteMessages::single(RoutedMessage {
            cc_id: cc_id.clone(),
            destination_chain: self.config.hub.hub_chain.clone(),
            destination_address: self.config.hub.its_hub.clone(),
            source_address: self.config.hub.xrpl_multisig.to_string(),
            payload_hash: unfurled.payload_hash.clone(),
        }));

        info!(message_id = %cc_id.message_id, "routing the hub message to the token service");

        let tx_hash = submit_until_terminal(
            || self.hub.execute(&self.config.hub.axelarnet_gateway, msg.clone()),
            |tx: TxResponse| {
                Ok(if tx.code == 0 {
                    Classification::Terminal(tx.txhash)
                } else {
                    Classification::Pending(format!("routing request returned code {}", tx.code))
                })
            },
            self.route_policy(),
        )
        .await
        .change_context(Error::HubRouting)?;

        info!(tx = %tx_hash, "hub routing request submitted");
        Ok(())
    }

    async fn construct_proof(&self, cc_id: &CrossChainId) -> Result<String, Error> {
        let msg = to_json(&ConstructProof::single(
            cc_id.on_chain(&self.config.hub.hub_chain),
        ));

        info!(message_id = %cc_id.message_id, "requesting proof construction");

        let session_id = submit_until_terminal(
            || self.hub.execute(&self.config.hub.multisig_prover, msg.clone()),
            |tx: TxResponse| match tx.find_event(EVENT_PROOF_UNDER_CONSTRUCTION) {
                Some(event) => {
                    let value = event
                        .attribute(ATTRIBUTE_MULTISIG_SESSION_ID)
                        .ok_or_else(|| Report::new(poll::Error::Protocol))
                        .attach_printable("proof event carries no multisig session id")?;

                    // the attribute value is itself a JSON-quoted string
                    serde_json::from_str::<String>(value)
                        .map(Classification::Terminal)
                        .change_context(poll::Error::Protocol)
                }
                None => Ok(Classification::Pending(
                    "proof construction has not started".to_string(),
                )),
            },
            self.policy(),
        )
        .await
        .change_context(Error::ProofConstruction)?;

        info!(%session_id, "proof under construction");
        Ok(session_id)
    }

    async fn fetch_proof(&self, session_id: String) -> Result<String, Error> {
        let query = to_json(&ProofQuery::for_session(session_id));

        info!("waiting for the signing session to complete");

        submit_until_terminal(
            || self.hub.query(&self.config.hub.multisig_prover, query.clone()),
            |raw: serde_json::Value| {
                Ok(match serde_json::from_value::<ProofQueryResponse>(raw) {
                    Ok(response) => match response.data.status {
                        ProofStatus::Completed { execute_data } => {
                            Classification::Terminal(execute_data)
                        }
                        ProofStatus::Pending => {
                            Classification::Pending("signing session is still open".to_string())
                        }
                    },
                    // signing states other than pending/completed are also
                    // not terminal
                    Err(_) => Classification::Pending("proof status is not final".to_string()),
                })
            },
            self.policy(),
        )
        .await
        .change_context(Error::ProofFetch)
    }

    async fn submit_execute_data(&self, execute_data: &str) -> Result<H256, Error> {
        let raw = hex::decode(execute_data)
            .change_context(Error::GatewaySubmission)
            .attach_printable("execute data is not valid hex")?;

        info!("submitting execute data to the destination gateway");

        self.destination
            .submit_execute_data(raw)
            .await
            .change_context(Error::GatewaySubmission)
    }

    async fn execute_application(
        &self,
        cc_id: &CrossChainId,
        unfurled: &UnfurledEvent,
    ) -> Result<H256, Error> {
        let command_id = evm::command_id(&unfurled.source_chain, &cc_id.message_id);
        let payload = hex::decode(&unfurled.payload)
            .change_context(Error::ApplicationExecution)
            .attach_printable("event payload is not valid hex")?;

        info!(
            command_id = %hex::encode(command_id),
            "executing the transfer on the destination application"
        );

        self.destination
            .execute_application(
                command_id,
                unfurled.source_chain.clone(),
                unfurled.source_address.clone(),
                payload,
            )
            .await
            .change_context(Error::ApplicationExecution)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;

    use assert_ok::assert_ok;
    use mockall::{predicate, Sequence};

    use super::*;
    use crate::events::{Event, EventAttribute};
    use crate::evm::MockDestinationClient;
    use crate::hub::{MockHubClient, TxLog};

    const TX_HASH: &str = "ee8c9ecec903ec9cfabc2ad36f2f4f00ee5685d1ef33e30f6189e394a4010b31";
    const MESSAGE_ID: &str =
        "0xee8c9ecec903ec9cfabc2ad36f2f4f00ee5685d1ef33e30f6189e394a4010b31-0";
    const SOURCE_ADDRESS: &str = "rwBkJRx6z3ETyrDsJtTgnis3YA61cVaUxh";
    const SOURCE_ADDRESS_HEX: &str = "64c16fe7a7149bcb390d3eaf5c0f51d9236a4160";
    const DESTINATION_ADDRESS: &str = "7b1bf875977e4124dc781153bd6393c8e1c22739";
    const PAYLOAD_HASH: &str = "BA09F92F375483C1DD1425753053A187817F46B96AD6B1756E68347B7CD5B4E8";
    const EVENT_PAYLOAD_HASH: &str =
        "ba09f92f375483c1dd1425753053a187817f46b96ad6b1756e68347b7cd5b4e8";
    const SESSION_ID: &str = "5529";
    const EXECUTE_DATA: &str = "0a0b0c";
    // keccak256("axelarnet_<message id>")
    const COMMAND_ID: &str = "d0bddc543961c0852e07bc7286dbc6cf1436835b50d64a5e472d7d05ae72007e";

    fn request() -> RelayRequest {
        RelayRequest {
            tx_hash: TX_HASH.to_string(),
            source_address: SOURCE_ADDRESS.to_string(),
            destination_address: DESTINATION_ADDRESS.to_string(),
            amount: "2050000".to_string(),
            payload_hash: PAYLOAD_HASH.to_string(),
            payload: "1212".to_string(),
        }
    }

    fn event(event_type: &str, attributes: Vec<(&str, &str)>) -> Event {
        Event {
            event_type: event_type.to_string(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| EventAttribute {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    fn tx_response(events: Vec<Event>) -> TxResponse {
        TxResponse {
            txhash: "6C4B0358B1".to_string(),
            code: 0,
            raw_log: String::new(),
            logs: vec![TxLog { events }],
        }
    }

    fn tx_response_with_code(code: u32) -> TxResponse {
        TxResponse {
            txhash: "6C4B0358B1".to_string(),
            code,
            raw_log: String::new(),
            logs: vec![],
        }
    }

    fn contract_called_event() -> Event {
        let its_hub = Config::default().hub.its_hub;
        event(
            EVENT_CONTRACT_CALLED,
            vec![
                ("source_chain", "axelarnet"),
                ("source_address", its_hub.as_str()),
                ("message_id", MESSAGE_ID),
                ("payload", "1212"),
                ("payload_hash", EVENT_PAYLOAD_HASH),
                ("destination_chain", "xrpl-evm-sidechain"),
                ("destination_address", DESTINATION_ADDRESS),
            ],
        )
    }

    fn proof_event() -> Event {
        event(
            EVENT_PROOF_UNDER_CONSTRUCTION,
            vec![("multisig_session_id", "\"5529\"")],
        )
    }

    fn expected_envelope() -> String {
        hex::encode(
            RoutedTransfer {
                remote_chain: "xrpl-evm-sidechain".to_string(),
                transfer: Transfer {
                    token_id: Config::default().hub.xrp_token_id,
                    source_address: hex::decode(SOURCE_ADDRESS_HEX).unwrap(),
                    destination_address: hex::decode(DESTINATION_ADDRESS).unwrap(),
                    amount: U256::from(2_050_000_000_000_000_000_u64),
                    data: vec![0x12, 0x12],
                },
            }
            .abi_encode(),
        )
    }

    fn expected_user_message() -> serde_json::Value {
        serde_json::to_value(UserMessage {
            tx_id: hex::decode(TX_HASH).unwrap(),
            source_address: hex::decode(SOURCE_ADDRESS_HEX).unwrap(),
            destination_chain: "xrpl-evm-sidechain".to_string(),
            destination_address: DESTINATION_ADDRESS.to_string(),
            amount: DropsAmount { drops: 2_050_000 },
            payload_hash: PAYLOAD_HASH.to_string(),
        })
        .unwrap()
    }

    fn relayer(
        hub: MockHubClient,
        destination: MockDestinationClient,
    ) -> Relayer<MockHubClient, MockDestinationClient> {
        Relayer::new(Config::default(), hub, destination)
    }

    #[tokio::test(start_paused = true)]
    async fn relays_reference_payment_end_to_end() {
        let config = Config::default();
        let mut seq = Sequence::new();
        let mut hub = MockHubClient::new();
        let mut destination = MockDestinationClient::new();

        let xrpl_gateway = config.hub.xrpl_gateway.clone();
        let user_message = expected_user_message();
        hub.expect_execute()
            .withf(move |contract, msg| {
                contract == xrpl_gateway
                    && msg["verify_messages"][0]["user_message"] == user_message
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![event(EVENT_ALREADY_VERIFIED, vec![])])));

        let xrpl_gateway = config.hub.xrpl_gateway.clone();
        let user_message = expected_user_message();
        hub.expect_execute()
            .withf(move |contract, msg| {
                contract == xrpl_gateway
                    && msg["route_incoming_messages"][0]["payload"] == "1212"
                    && msg["route_incoming_messages"][0]["message"]["user_message"] == user_message
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![event(EVENT_MESSAGE_ROUTED, vec![])])));

        let axelarnet_gateway = config.hub.axelarnet_gateway.clone();
        let envelope = expected_envelope();
        hub.expect_execute()
            .withf(move |contract, msg| {
                contract == axelarnet_gateway
                    && msg["execute"]["cc_id"]["source_chain"] == "xrpl"
                    && msg["execute"]["cc_id"]["message_id"] == MESSAGE_ID
                    && msg["execute"]["payload"] == envelope
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![contract_called_event()])));

        let axelarnet_gateway = config.hub.axelarnet_gateway.clone();
        let its_hub = config.hub.its_hub.clone();
        hub.expect_execute()
            .withf(move |contract, msg| {
                let routed = &msg["route_messages"][0];
                contract == axelarnet_gateway
                    && routed["cc_id"]["source_chain"] == "xrpl"
                    && routed["cc_id"]["message_id"] == MESSAGE_ID
                    && routed["destination_chain"] == "axelarnet"
                    && routed["destination_address"] == its_hub
                    && routed["source_address"] == "rP9iHnCmJcVPtzCwYJjU1fryC2pEcVqDHv"
                    && routed["payload_hash"] == EVENT_PAYLOAD_HASH
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response_with_code(0)));

        let multisig_prover = config.hub.multisig_prover.clone();
        hub.expect_execute()
            .withf(move |contract, msg| {
                contract == multisig_prover
                    && msg["construct_proof"][0]["source_chain"] == "axelarnet"
                    && msg["construct_proof"][0]["message_id"] == MESSAGE_ID
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![proof_event()])));

        let multisig_prover = config.hub.multisig_prover.clone();
        hub.expect_query()
            .withf(move |contract, query| {
                contract == multisig_prover && query["proof"]["multisig_session_id"] == SESSION_ID
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(serde_json::json!({
                    "data": { "status": { "completed": { "execute_data": EXECUTE_DATA } } }
                }))
            });

        destination
            .expect_submit_execute_data()
            .with(predicate::eq(vec![0x0a, 0x0b, 0x0c]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(H256::repeat_byte(0x01)));

        let its_hub = config.hub.its_hub.clone();
        destination
            .expect_execute_application()
            .withf(move |command_id, source_chain, source_address, payload| {
                hex::encode(command_id) == COMMAND_ID
                    && source_chain.as_str() == "axelarnet"
                    && source_address == &its_hub
                    && payload == &[0x12, 0x12]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(H256::repeat_byte(0x02)));

        let relayer = Relayer::new(config, hub, destination);
        let tx = assert_ok!(relayer.relay(&request()).await);
        assert_eq!(tx, H256::repeat_byte(0x02));
    }

    #[tokio::test(start_paused = true)]
    async fn verify_waits_for_the_quorum() {
        let mut seq = Sequence::new();
        let mut hub = MockHubClient::new();

        hub.expect_execute()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![])));
        hub.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![event(EVENT_ALREADY_VERIFIED, vec![])])));

        let relayer = relayer(hub, MockDestinationClient::new());
        let prepared = Prepared::from_request(&request(), &Config::default()).unwrap();
        assert_ok!(relayer.verify(&prepared).await);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_verification_aborts_without_retry() {
        let mut hub = MockHubClient::new();
        hub.expect_execute()
            .times(1)
            .returning(|_, _| Ok(tx_response(vec![event(EVENT_ALREADY_REJECTED, vec![])])));

        let relayer = relayer(hub, MockDestinationClient::new());
        let result = relayer.relay(&request()).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            Error::Verification
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hub_execution_retries_while_logs_are_empty() {
        let mut seq = Sequence::new();
        let mut hub = MockHubClient::new();

        hub.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![])));
        hub.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(tx_response(vec![contract_called_event()])));

        let relayer = relayer(hub, MockDestinationClient::new());
        let prepared = Prepared::from_request(&request(), &Config::default()).unwrap();
        let cc_id = CrossChainId::from_tx("xrpl", &prepared.tx_hash, 0);

        let unfurled = assert_ok!(relayer.execute_hub_message(&prepared, &cc_id).await);
        assert_eq!(unfurled.message_id, MESSAGE_ID);
        assert_eq!(unfurled.payload_hash, EVENT_PAYLOAD_HASH);
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_hub_event_is_fatal() {
        let mut hub = MockHubClient::new();
        hub.expect_execute().times(1).returning(|_, _| {
            let mut called = contract_called_event();
            called
                .attributes
                .retain(|attribute| attribute.key != "payload_hash");
            Ok(tx_response(vec![called]))
        });

        let relayer = relayer(hub, MockDestinationClient::new());
        let prepared = Prepared::from_request(&request(), &Config::default()).unwrap();
        let cc_id = CrossChainId::from_tx("xrpl", &prepared.tx_hash, 0);

        let result = relayer.execute_hub_message(&prepared, &cc_id).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            Error::HubExecution
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hub_routing_gives_up_after_the_attempt_limit() {
        let mut config = Config::default();
        config.route_attempt_limit = NonZeroU64::new(2);

        let mut hub = MockHubClient::new();
        hub.expect_execute()
            .times(2)
            .returning(|_, _| Ok(tx_response_with_code(5)));

        let relayer = Relayer::new(config, hub, MockDestinationClient::new());
        let cc_id = CrossChainId {
            source_chain: "xrpl".to_string(),
            message_id: MESSAGE_ID.to_string(),
        };
        let unfurled = UnfurledEvent {
            payload_hash: EVENT_PAYLOAD_HASH.to_string(),
            ..UnfurledEvent::default()
        };

        let result = relayer.route_hub_message(&cc_id, &unfurled).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            Error::HubRouting
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn proof_event_without_session_id_is_fatal() {
        let mut hub = MockHubClient::new();
        hub.expect_execute()
            .times(1)
            .returning(|_, _| Ok(tx_response(vec![event(EVENT_PROOF_UNDER_CONSTRUCTION, vec![])])));

        let relayer = relayer(hub, MockDestinationClient::new());
        let cc_id = CrossChainId {
            source_chain: "xrpl".to_string(),
            message_id: MESSAGE_ID.to_string(),
        };

        let result = relayer.construct_proof(&cc_id).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            Error::ProofConstruction
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn proof_fetch_retries_until_completed() {
        let mut seq = Sequence::new();
        let mut hub = MockHubClient::new();

        hub.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(serde_json::json!({ "data": { "status": "pending" } })));
        hub.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(serde_json::json!({ "data": { "status": { "signing": {} } } })));
        hub.expect_query().times(1).in_sequence(&mut seq).returning(|_, _| {
            Ok(serde_json::json!({
                "data": { "status": { "completed": { "execute_data": EXECUTE_DATA } } }
            }))
        });

        let relayer = relayer(hub, MockDestinationClient::new());
        let execute_data = assert_ok!(relayer.fetch_proof(SESSION_ID.to_string()).await);
        assert_eq!(execute_data, EXECUTE_DATA);
    }

    #[tokio::test(start_paused = true)]
    async fn overflowing_amount_fails_before_any_submission() {
        let mut request = request();
        request.amount = "100000000000000001".to_string();

        // no expectations: the hub and destination must never be called
        let relayer = relayer(MockHubClient::new(), MockDestinationClient::new());
        let result = relayer.relay(&request).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            Error::AmountOutOfRange(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn non_numeric_amount_fails_before_any_submission() {
        let mut request = request();
        request.amount = "2.05".to_string();

        let relayer = relayer(MockHubClient::new(), MockDestinationClient::new());
        let result = relayer.relay(&request).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            Error::AmountOutOfRange(_)
        ));
    }

    #[test]
    fn prepare_translates_the_source_address() {
        let prepared = Prepared::from_request(&request(), &Config::default()).unwrap();
        assert_eq!(
            prepared.user_message.source_address,
            hex::decode(SOURCE_ADDRESS_HEX).unwrap()
        );
        assert_eq!(prepared.user_message.tx_id, hex::decode(TX_HASH).unwrap());
        assert_eq!(prepared.user_message.amount.drops, 2_050_000);
        assert_eq!(prepared.user_message.destination_chain, "xrpl-evm-sidechain");
    }

    #[test]
    fn prepare_rejects_malformed_addresses() {
        let mut bad_source = request();
        bad_source.source_address = "not-an-address".to_string();
        assert!(matches!(
            Prepared::from_request(&bad_source, &Config::default())
                .unwrap_err()
                .current_context(),
            Error::MalformedAddress
        ));

        let mut bad_destination = request();
        bad_destination.destination_address = "7b1b".to_string();
        assert!(matches!(
            Prepared::from_request(&bad_destination, &Config::default())
                .unwrap_err()
                .current_context(),
            Error::MalformedDestinationAddress
        ));
    }

    #[test]
    fn amount_scaling_adds_twelve_decimals() {
        assert_eq!(
            scaled_amount(2_050_000),
            U256::from(2_050_000_000_000_000_000_u64)
        );
        assert_eq!(scaled_amount(1), U256::from(1_000_000_000_000_u64));
        assert_eq!(
            scaled_amount(XRP_MAX_DROPS),
            U256::from(10_u64).pow(U256::from(29_u64))
        );
    }
}
