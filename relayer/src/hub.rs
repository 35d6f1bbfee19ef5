//! Client for the hub chain, driving contracts through the `axelard` CLI.
//! Every failure here is transient from the pipeline's point of view: the
//! stage executor retries the submission until the chain answers.

use async_trait::async_trait;
use error_stack::{Report, Result, ResultExt};
use mockall::automock;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::HubConfig;
use crate::events::Event;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to run {0}")]
    Process(String),
    #[error("{0} exited unsuccessfully: {1}")]
    CommandFailed(String, String),
    #[error("command output is not valid JSON")]
    MalformedResponse,
}

/// A broadcast transaction result, as printed by the CLI with JSON output.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TxResponse {
    pub txhash: String,
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default)]
    pub logs: Vec<TxLog>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TxLog {
    #[serde(default)]
    pub events: Vec<Event>,
}

impl TxResponse {
    /// First event of the given type across all logs.
    pub fn find_event(&self, event_type: &str) -> Option<&Event> {
        self.logs
            .iter()
            .flat_map(|log| log.events.iter())
            .find(|event| event.event_type == event_type)
    }
}

#[automock]
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Submit an execute transaction to a hub contract.
    async fn execute(&self, contract: &str, msg: serde_json::Value)
        -> Result<TxResponse, Error>;

    /// Run a read-only smart query against a hub contract.
    async fn query(&self, contract: &str, query: serde_json::Value)
        -> Result<serde_json::Value, Error>;
}

pub struct Axelard {
    config: HubConfig,
}

impl Axelard {
    pub fn new(config: HubConfig) -> Self {
        Self { config }
    }

    fn tx_args(&self, contract: &str, msg: &serde_json::Value) -> Vec<String> {
        vec![
            "tx".into(),
            "wasm".into(),
            "execute".into(),
            contract.into(),
            msg.to_string(),
            "--from".into(),
            self.config.signer.clone(),
            "--keyring-backend".into(),
            self.config.keyring_backend.clone(),
            "--keyring-dir".into(),
            self.config.keyring_dir.clone(),
            "--gas".into(),
            self.config.gas.to_string(),
            "--gas-adjustment".into(),
            self.config.gas_adjustment.to_string(),
            "--gas-prices".into(),
            self.config.gas_prices.clone(),
            "--chain-id".into(),
            self.config.chain_id.clone(),
            "--node".into(),
            self.config.node.to_string(),
            "--output".into(),
            "json".into(),
            "--yes".into(),
        ]
    }

    fn query_args(&self, contract: &str, query: &serde_json::Value) -> Vec<String> {
        vec![
            "q".into(),
            "wasm".into(),
            "contract-state".into(),
            "smart".into(),
            contract.into(),
            query.to_string(),
            "--output".into(),
            "json".into(),
            "--node".into(),
            self.config.node.to_string(),
        ]
    }

    async fn run(&self, args: Vec<String>) -> Result<String, Error> {
        debug!(binary = %self.config.binary, "running hub command");

        let output = Command::new(&self.config.binary)
            .args(&args)
            .output()
            .await
            .change_context_lazy(|| Error::Process(self.config.binary.clone()))?;

        if !output.status.success() {
            return Err(Report::new(Error::CommandFailed(
                self.config.binary.clone(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl HubClient for Axelard {
    async fn execute(
        &self,
        contract: &str,
        msg: serde_json::Value,
    ) -> Result<TxResponse, Error> {
        let stdout = self.run(self.tx_args(contract, &msg)).await?;
        serde_json::from_str(&stdout).change_context(Error::MalformedResponse)
    }

    async fn query(
        &self,
        contract: &str,
        query: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let stdout = self.run(self.query_args(contract, &query)).await?;
        serde_json::from_str(&stdout).change_context(Error::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client() -> Axelard {
        Axelard::new(Config::default().hub)
    }

    #[test]
    fn tx_args_address_the_configured_contract_and_node() {
        let msg = serde_json::json!({ "verify_messages": [] });
        let args = client().tx_args("axelar1contract", &msg);

        assert_eq!(args[..5], [
            "tx".to_string(),
            "wasm".to_string(),
            "execute".to_string(),
            "axelar1contract".to_string(),
            r#"{"verify_messages":[]}"#.to_string(),
        ]);
        assert!(args.contains(&"--yes".to_string()));
        assert!(args.contains(&"devnet-amplifier".to_string()));
    }

    #[test]
    fn query_args_are_read_only() {
        let query = serde_json::json!({ "proof": { "multisig_session_id": "1" } });
        let args = client().query_args("axelar1prover", &query);

        assert_eq!(args[0], "q");
        assert!(!args.contains(&"--from".to_string()));
    }

    #[test]
    fn deserializes_tx_response_with_logs() {
        let response: TxResponse = serde_json::from_str(
            r#"{
                "height": "123",
                "txhash": "6C4B…",
                "code": 0,
                "raw_log": "[]",
                "logs": [{"msg_index": 0, "events": [
                    {"type": "message", "attributes": [{"key": "action", "value": "execute"}]},
                    {"type": "wasm-message_routed", "attributes": []}
                ]}]
            }"#,
        )
        .unwrap();

        assert_eq!(response.code, 0);
        assert!(response.find_event("wasm-message_routed").is_some());
        assert!(response.find_event("wasm-already_verified").is_none());
    }

    #[test]
    fn deserializes_tx_response_without_logs() {
        let response: TxResponse =
            serde_json::from_str(r#"{"txhash": "6C4B…", "code": 5}"#).unwrap();
        assert_eq!(response.code, 5);
        assert!(response.logs.is_empty());
    }

    #[tokio::test]
    async fn failing_command_is_reported() {
        let mut config = Config::default().hub;
        config.binary = "false".to_string();

        let result = Axelard::new(config).run(vec![]).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            Error::CommandFailed(..)
        ));
    }
}
