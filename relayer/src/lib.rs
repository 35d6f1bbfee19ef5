pub mod artifact;
pub mod commands;
pub mod config;
mod error;
pub mod events;
pub mod evm;
pub mod hub;
pub mod msg;
pub mod poll;
pub mod relay;

pub use error::Error;
