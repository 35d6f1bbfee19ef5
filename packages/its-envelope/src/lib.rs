use alloy_primitives::{Bytes, FixedBytes, U256};
use alloy_sol_types::{sol, SolValue};
use error_stack::{Report, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid hub message: {0}")]
    InvalidMessage(String),
}

// Payload layout shared with the hub's interchain token service and the
// destination edge contracts. The inner message carries the transfer itself;
// the outer one tags it as hub-routed and names the remote chain.
sol! {
    enum MessageType {
        InterchainTransfer,
        DeployInterchainToken,
        DeployTokenManager,
        RoutedCall,
    }

    struct InterchainTransfer {
        uint256 messageType;
        bytes32 tokenId;
        bytes sourceAddress;
        bytes destinationAddress;
        uint256 amount;
        bytes data;
    }

    struct RoutedCall {
        uint256 messageType;
        string remote_chain;
        bytes message;
    }
}

/// A single token transfer, before wrapping for the hub.
///
/// `amount` is already expressed in the destination chain's 18-decimal
/// fixed-point representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub token_id: [u8; 32],
    pub source_address: Vec<u8>,
    pub destination_address: Vec<u8>,
    pub amount: U256,
    pub data: Vec<u8>,
}

/// A transfer wrapped for routing through the hub, tagged with the remote
/// chain name. On the way into the hub the remote chain is the true
/// destination chain of the transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedTransfer {
    pub remote_chain: String,
    pub transfer: Transfer,
}

impl RoutedTransfer {
    pub fn abi_encode(&self) -> Vec<u8> {
        let message = InterchainTransfer {
            messageType: U256::from(MessageType::InterchainTransfer as u64),
            tokenId: FixedBytes::<32>::new(self.transfer.token_id),
            sourceAddress: Bytes::copy_from_slice(&self.transfer.source_address),
            destinationAddress: Bytes::copy_from_slice(&self.transfer.destination_address),
            amount: self.transfer.amount,
            data: Bytes::copy_from_slice(&self.transfer.data),
        }
        .abi_encode();

        RoutedCall {
            messageType: U256::from(MessageType::RoutedCall as u64),
            remote_chain: self.remote_chain.clone(),
            message: Bytes::from(message),
        }
        .abi_encode()
    }

    pub fn abi_decode(payload: &[u8]) -> Result<Self, Error> {
        let routed = RoutedCall::abi_decode(payload, true)
            .map_err(|err| Error::InvalidMessage(err.to_string()))?;

        if routed.messageType != U256::from(MessageType::RoutedCall as u64) {
            return Err(Report::new(Error::InvalidMessage(
                "not a hub-routed call".into(),
            )));
        }

        let transfer = InterchainTransfer::abi_decode(&routed.message, true)
            .map_err(|err| Error::InvalidMessage(err.to_string()))?;

        if transfer.messageType != U256::from(MessageType::InterchainTransfer as u64) {
            return Err(Report::new(Error::InvalidMessage(
                "unsupported inner message".into(),
            )));
        }

        Ok(RoutedTransfer {
            remote_chain: routed.remote_chain,
            transfer: Transfer {
                token_id: transfer.tokenId.into(),
                source_address: transfer.sourceAddress.to_vec(),
                destination_address: transfer.destinationAddress.to_vec(),
                amount: transfer.amount,
                data: transfer.data.to_vec(),
            },
        })
    }
}
