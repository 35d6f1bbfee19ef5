mod account;
pub mod error;
mod tx_hash;

pub use account::{AccountId, ACCOUNT_ID_LENGTH};
pub use tx_hash::{TxHash, TX_HASH_LENGTH};

pub const XRP_DECIMALS: u8 = 6;

/// Total XRP supply in drops, the largest amount a ledger entry can carry.
pub const XRP_MAX_DROPS: u64 = 100_000_000_000_000_000;
