//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    /// No operation given, or help requested
    #[error("no operation given")]
    Help,

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    /// Whether the usage text should accompany this error.
    pub fn shows_usage(&self) -> bool {
        matches!(self, CliError::Help | CliError::Usage(_))
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Help | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(_) | ApplicationError::SwarmRequired(_) => {
                    exitcode::USAGE
                }
                ApplicationError::StackNotFound(_) | ApplicationError::DescriptorNotFound { .. } => {
                    exitcode::NOINPUT
                }
                ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::CommandFailed { exit_code, .. } => {
                    exit_code.unwrap_or(exitcode::SOFTWARE)
                }
                ApplicationError::OperationFailed { .. } => exitcode::IOERR,
            },
        }
    }
}
