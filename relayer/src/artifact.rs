use std::fs;
use std::path::Path;

use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read artifact at {0}")]
    Read(String),
    #[error("artifact is not valid JSON")]
    Parse,
    #[error("artifact is missing required field {0}")]
    MissingField(&'static str),
}

/// A payment observed on the source ledger, as exported by the sending tool.
/// Addresses and hashes stay in their source encodings; translation happens
/// when the relay pipeline builds its first hub request.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RelayRequest {
    pub tx_hash: String,
    pub source_address: String,
    pub destination_address: String,
    pub amount: String,
    pub payload_hash: String,
    pub payload: String,
}

pub fn load(path: &Path) -> Result<RelayRequest, Error> {
    let content = fs::read_to_string(path)
        .change_context_lazy(|| Error::Read(path.display().to_string()))?;
    parse(&content)
}

fn parse(content: &str) -> Result<RelayRequest, Error> {
    let request: RelayRequest = serde_json::from_str(content).change_context(Error::Parse)?;

    for (field, value) in [
        ("tx_hash", &request.tx_hash),
        ("source_address", &request.source_address),
        ("destination_address", &request.destination_address),
        ("amount", &request.amount),
        ("payload_hash", &request.payload_hash),
        ("payload", &request.payload),
    ] {
        if value.is_empty() {
            return Err(Report::new(Error::MissingField(field)));
        }
    }

    Ok(request)
}
