use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid account address {0}")]
    InvalidAddress(String),
    #[error("invalid transaction hash {0}")]
    InvalidTxHash(String),
}
