use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load config, falling back on default")]
    LoadConfig,
    #[error("failed to load the relay artifact")]
    Artifact,
    #[error("destination signing key is not available")]
    MissingSigningKey,
    #[error("connection failed")]
    Connection,
    #[error("relay failed")]
    Relay,
}
