//! Request and response bodies exchanged with the hub contracts. Field names
//! and nesting mirror the contracts' execute and query message schemas.

use serde::{Deserialize, Serialize};
use xrpl_codec::TxHash;

/// Canonical cross-chain envelope for a payment leaving the source ledger.
/// Byte fields serialize as JSON number arrays, which is the form the
/// gateway contract expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub tx_id: Vec<u8>,
    pub source_address: Vec<u8>,
    pub destination_chain: String,
    pub destination_address: String,
    pub amount: DropsAmount,
    pub payload_hash: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropsAmount {
    pub drops: u64,
}

/// Correlation key for a message inside the hub, minted from the source
/// transaction and the event log index. Minting is deterministic, so
/// re-running a crashed relay reproduces the same identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainId {
    pub source_chain: String,
    pub message_id: String,
}

impl CrossChainId {
    pub fn from_tx(source_chain: impl Into<String>, tx_hash: &TxHash, log_index: u64) -> Self {
        Self {
            source_chain: source_chain.into(),
            message_id: format!("{tx_hash}-{log_index}"),
        }
    }

    /// The same message referenced from another chain's point of view.
    pub fn on_chain(&self, source_chain: impl Into<String>) -> Self {
        Self {
            source_chain: source_chain.into(),
            message_id: self.message_id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifyMessages {
    pub verify_messages: Vec<VerifyMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifyMessage {
    pub user_message: UserMessage,
}

impl VerifyMessages {
    pub fn single(user_message: UserMessage) -> Self {
        Self {
            verify_messages: vec![VerifyMessage { user_message }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteIncomingMessages {
    pub route_incoming_messages: Vec<RouteIncomingMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteIncomingMessage {
    pub payload: String,
    pub message: IncomingMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncomingMessage {
    pub user_message: UserMessage,
}

impl RouteIncomingMessages {
    pub fn single(payload: String, user_message: UserMessage) -> Self {
        Self {
            route_incoming_messages: vec![RouteIncomingMessage {
                payload,
                message: IncomingMessage { user_message },
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Execute {
    pub execute: ExecuteMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecuteMessage {
    pub cc_id: CrossChainId,
    /// Hex without a `0x` prefix.
    pub payload: String,
}

impl Execute {
    pub fn new(cc_id: CrossChainId, payload: String) -> Self {
        Self {
            execute: ExecuteMessage { cc_id, payload },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteMessages {
    pub route_messages: Vec<RoutedMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoutedMessage {
    pub cc_id: CrossChainId,
    pub destination_chain: String,
    pub destination_address: String,
    pub source_address: String,
    pub payload_hash: String,
}

impl RouteMessages {
    pub fn single(message: RoutedMessage) -> Self {
        Self {
            route_messages: vec![message],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstructProof {
    pub construct_proof: Vec<CrossChainId>,
}

impl ConstructProof {
    pub fn single(cc_id: CrossChainId) -> Self {
        Self {
            construct_proof: vec![cc_id],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProofQuery {
    pub proof: ProofKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProofKey {
    pub multisig_session_id: String,
}

impl ProofQuery {
    pub fn for_session(multisig_session_id: String) -> Self {
        Self {
            proof: ProofKey {
                multisig_session_id,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProofQueryResponse {
    pub data: ProofResponse,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProofResponse {
    pub status: ProofStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofStatus {
    Pending,
    Completed {
        /// Hex without a `0x` prefix, ready to submit to the destination
        /// gateway as-is.
        execute_data: String,
    },
}
