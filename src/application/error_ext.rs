//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context
//! and for turning delegated command results into fail-fast errors.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Output};

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.write(&env_file, &content)
    ///     .with_path_context("write env file", &env_file)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Render a command and its arguments for messages and logs.
pub fn command_line(cmd: &str, args: &[&str]) -> String {
    std::iter::once(cmd)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extension trait turning the result of a delegated command into an error
/// when the command could not be started or exited non-zero.
pub trait CommandResultExt {
    type Checked;

    fn check(self, command: &str) -> ApplicationResult<Self::Checked>;
}

impl CommandResultExt for io::Result<ExitStatus> {
    type Checked = ();

    fn check(self, command: &str) -> ApplicationResult<()> {
        let status = self.map_err(|e| spawn_failed(command, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(ApplicationError::CommandFailed {
                command: command.to_string(),
                exit_code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

impl CommandResultExt for io::Result<Output> {
    type Checked = Output;

    fn check(self, command: &str) -> ApplicationResult<Output> {
        let output = self.map_err(|e| spawn_failed(command, e))?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(ApplicationError::CommandFailed {
                command: command.to_string(),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

fn spawn_failed(command: &str, e: io::Error) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: format!("run {command}"),
        source: Box::new(e),
    }
}
