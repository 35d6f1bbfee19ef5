use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::Error;

pub const ACCOUNT_ID_LENGTH: usize = 20;

// version byte ++ account id ++ checksum
const BODY_LENGTH: usize = 1 + ACCOUNT_ID_LENGTH;
const PAYLOAD_LENGTH: usize = BODY_LENGTH + CHECKSUM_LENGTH;
const CHECKSUM_LENGTH: usize = 4;
const ACCOUNT_ID_VERSION: u8 = 0x00;

/// The 20-byte identifier behind a classic `r...` address.
///
/// Parsing validates the version byte and the double-SHA256 checksum, so a
/// successfully parsed address always round-trips through [`fmt::Display`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountId([u8; ACCOUNT_ID_LENGTH]);

impl AccountId {
    pub const fn as_bytes(&self) -> [u8; ACCOUNT_ID_LENGTH] {
        self.0
    }

    pub fn new(bytes: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8; ACCOUNT_ID_LENGTH]> for AccountId {
    fn as_ref(&self) -> &[u8; ACCOUNT_ID_LENGTH] {
        &self.0
    }
}

impl From<[u8; ACCOUNT_ID_LENGTH]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        AccountId(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut payload = Vec::<u8>::with_capacity(PAYLOAD_LENGTH);
        payload.push(ACCOUNT_ID_VERSION);
        payload.extend_from_slice(&self.0);
        payload.extend_from_slice(&checksum(&payload));

        let encoded = bs58::encode(payload)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .into_string();

        write!(f, "{}", encoded)
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(address: &str) -> Result<Self, Error> {
        let decoded = bs58::decode(address)
            .with_alphabet(bs58::Alphabet::RIPPLE)
            .into_vec()
            .map_err(|_| Error::InvalidAddress(address.to_string()))?;

        if decoded.len() != PAYLOAD_LENGTH || decoded[0] != ACCOUNT_ID_VERSION {
            return Err(Error::InvalidAddress(address.to_string()));
        }

        let (payload, expected) = decoded.split_at(BODY_LENGTH);
        if checksum(payload) != expected {
            return Err(Error::InvalidAddress(address.to_string()));
        }

        let mut buffer = [0u8; ACCOUNT_ID_LENGTH];
        buffer.copy_from_slice(&payload[1..]);
        Ok(AccountId(buffer))
    }
}

impl TryFrom<String> for AccountId {
    type Error = Error;

    fn try_from(address: String) -> Result<Self, Error> {
        AccountId::from_str(address.as_str())
    }
}

impl Serialize for AccountId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let address = String::deserialize(deserializer)?;
        AccountId::from_str(&address).map_err(serde::de::Error::custom)
    }
}

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut checksum = [0u8; CHECKSUM_LENGTH];
    checksum.copy_from_slice(&digest[..CHECKSUM_LENGTH]);
    checksum
}
