use thiserror::Error;
use twitch_live::ProbeError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
