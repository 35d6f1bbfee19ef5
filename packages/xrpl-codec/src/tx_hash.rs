use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const TX_HASH_LENGTH: usize = 32;

/// A ledger transaction hash. Displays as `0x`-prefixed lowercase hex,
/// the form downstream message identifiers are built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TxHash([u8; TX_HASH_LENGTH]);

impl TxHash {
    pub const fn as_bytes(&self) -> [u8; TX_HASH_LENGTH] {
        self.0
    }

    pub fn new(bytes: [u8; TX_HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8; TX_HASH_LENGTH]> for TxHash {
    fn as_ref(&self) -> &[u8; TX_HASH_LENGTH] {
        &self.0
    }
}

impl From<[u8; TX_HASH_LENGTH]> for TxHash {
    fn from(bytes: [u8; TX_HASH_LENGTH]) -> Self {
        TxHash(bytes)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = Error;

    fn from_str(hash: &str) -> Result<Self, Error> {
        let stripped = hash.strip_prefix("0x").unwrap_or(hash);
        let decoded =
            hex::decode(stripped).map_err(|_| Error::InvalidTxHash(hash.to_string()))?;

        let buffer: [u8; TX_HASH_LENGTH] = decoded
            .try_into()
            .map_err(|_| Error::InvalidTxHash(hash.to_string()))?;
        Ok(TxHash(buffer))
    }
}
