use clap::Subcommand;

pub mod xrpl_to_evm;

#[derive(Debug, Subcommand)]
pub enum SubCommand {
    /// Relay a payment artifact from the source ledger to the EVM sidechain
    XrplToEvm(xrpl_to_evm::Args),
}
