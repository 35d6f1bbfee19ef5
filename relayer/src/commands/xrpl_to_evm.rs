use std::path::PathBuf;

use error_stack::{Result, ResultExt};
use tracing::info;

use crate::artifact;
use crate::config::Config;
use crate::evm::EvmClient;
use crate::hub::Axelard;
use crate::relay::Relayer;
use crate::Error;

/// Environment variable holding the destination chain signing key (hex,
/// without a `0x` prefix). Kept out of the config file on purpose.
const SIGNING_KEY_VAR: &str = "DESTINATION_PRIVATE_KEY";

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to the artifact describing the source ledger payment
    pub artifact: PathBuf,
}

pub async fn run(config: Config, args: Args) -> Result<Option<String>, Error> {
    let request = artifact::load(&args.artifact).change_context(Error::Artifact)?;
    info!(tx_hash = %request.tx_hash, "loaded relay artifact");

    let signing_key =
        std::env::var(SIGNING_KEY_VAR).change_context(Error::MissingSigningKey)?;
    let destination = EvmClient::connect(&config.destination, &signing_key)
        .await
        .change_context(Error::Connection)?;
    let hub = Axelard::new(config.hub.clone());

    let tx = Relayer::new(config, hub, destination)
        .relay(&request)
        .await
        .change_context(Error::Relay)?;

    Ok(Some(format!(
        "relay completed in destination transaction {tx:#x}"
    )))
}
