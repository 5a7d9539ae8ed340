use thiserror::Error;
use tickerbook_core::{CoreError, SinkError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickerbook_core::ValidationError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Report(#[from] tickerbook_core::ReportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Sink(error) => Self::Sink(error),
            CoreError::Report(error) => Self::Report(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Sink(SinkError::Locked { .. }) => 3,
            Self::Sink(SinkError::Io { .. }) => 10,
            Self::Report(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
