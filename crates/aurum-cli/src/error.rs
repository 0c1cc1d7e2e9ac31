use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] aurum_core::ValidationError),

    #[error(transparent)]
    Fetch(#[from] aurum_core::ChunkError),

    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Fetch(aurum_core::ChunkError::Validation(_)) => 2,
            Self::Fetch(aurum_core::ChunkError::Cancelled) | Self::Interrupted => 130,
            Self::Fetch(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
