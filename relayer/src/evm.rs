//! Destination chain client. Submits the proven execute data to the external
//! gateway and calls the application contract, blocking until each
//! transaction is confirmed.

use std::sync::Arc;

use async_trait::async_trait;
use error_stack::{Report, Result, ResultExt};
use ethers::middleware::SignerMiddleware;
use ethers::prelude::abigen;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TransactionReceipt, TransactionRequest, H256, U256, U64};
use ethers::utils::keccak256;
use mockall::automock;
use thiserror::Error;

use crate::config::DestinationConfig;

abigen!(
    IAxelarExecutable,
    r#"[
        function execute(bytes32 commandId, string calldata sourceChain, string calldata sourceAddress, bytes calldata payload)
    ]"#
);

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to connect to the destination chain")]
    Connection,
    #[error("destination signing key is invalid")]
    InvalidKey,
    #[error("transaction submission failed")]
    TxFailed,
    #[error("transaction was dropped from the mempool")]
    TxDropped,
    #[error("transaction {0:#x} reverted")]
    TxReverted(H256),
}

/// Identifier under which the destination application stores an approved
/// command, derived from the source chain and the hub message id.
pub fn command_id(source_chain: &str, message_id: &str) -> [u8; 32] {
    keccak256(format!("{source_chain}_{message_id}").as_bytes())
}

#[automock]
#[async_trait]
pub trait DestinationClient: Send + Sync {
    /// Send the proven execute data to the external gateway as raw call data.
    async fn submit_execute_data(&self, execute_data: Vec<u8>) -> Result<H256, Error>;

    /// Invoke the application contract's execute entry point.
    async fn execute_application(
        &self,
        command_id: [u8; 32],
        source_chain: String,
        source_address: String,
        payload: Vec<u8>,
    ) -> Result<H256, Error>;
}

pub struct EvmClient {
    inner: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    gateway: Address,
    interchain_token_service: Address,
    gas_limit: U256,
}

impl EvmClient {
    pub async fn connect(config: &DestinationConfig, signing_key: &str) -> Result<Self, Error> {
        let provider =
            Provider::<Http>::try_from(config.rpc_url.as_str()).change_context(Error::Connection)?;
        let chain_id = provider
            .get_chainid()
            .await
            .change_context(Error::Connection)?;

        let wallet = signing_key
            .parse::<LocalWallet>()
            .change_context(Error::InvalidKey)?
            .with_chain_id(chain_id.as_u64());

        Ok(Self {
            inner: Arc::new(SignerMiddleware::new(provider, wallet)),
            gateway: config.gateway,
            interchain_token_service: config.interchain_token_service,
            gas_limit: U256::from(config.gas_limit),
        })
    }

    fn confirmed(receipt: Option<TransactionReceipt>) -> Result<H256, Error> {
        let receipt = receipt.ok_or_else(|| Report::new(Error::TxDropped))?;
        if receipt.status == Some(U64::zero()) {
            return Err(Report::new(Error::TxReverted(receipt.transaction_hash)));
        }
        Ok(receipt.transaction_hash)
    }
}

#[async_trait]
impl DestinationClient for EvmClient {
    async fn submit_execute_data(&self, execute_data: Vec<u8>) -> Result<H256, Error> {
        let tx = TransactionRequest::new()
            .to(self.gateway)
            .data(execute_data)
            .value(0);

        let receipt = self
            .inner
            .send_transaction(tx, None)
            .await
            .change_context(Error::TxFailed)?
            .await
            .change_context(Error::TxFailed)?;

        Self::confirmed(receipt)
    }

    async fn execute_application(
        &self,
        command_id: [u8; 32],
        source_chain: String,
        source_address: String,
        payload: Vec<u8>,
    ) -> Result<H256, Error> {
        let contract = IAxelarExecutable::new(self.interchain_token_service, self.inner.clone());

        let receipt = contract
            .execute(command_id, source_chain, source_address, payload.into())
            .gas(self.gas_limit)
            .send()
            .await
            .change_context(Error::TxFailed)?
            .await
            .change_context(Error::TxFailed)?;

        Self::confirmed(receipt)
    }
}
