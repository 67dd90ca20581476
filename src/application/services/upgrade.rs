//! Self-update: fast-forward the tool's own checkout

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::{command_line, ApplicationError, ApplicationResult, CommandResultExt};
use crate::config::Settings;
use crate::infrastructure::traits::{CommandOptions, CommandRunner, FileSystem};

pub struct UpgradeService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl UpgradeService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self { fs, cmd, settings }
    }

    /// Checkout to update: `source_dir`, else the directory of the executable.
    pub fn source_dir(&self) -> ApplicationResult<PathBuf> {
        if let Some(dir) = &self.settings.source_dir {
            return Ok(dir.clone());
        }
        let exe = std::env::current_exe().map_err(|e| ApplicationError::OperationFailed {
            context: "locate executable".to_string(),
            source: Box::new(e),
        })?;
        let exe = self.fs.canonicalize(&exe).unwrap_or(exe);
        exe.parent()
            .map(PathBuf::from)
            .ok_or_else(|| ApplicationError::Config {
                message: format!("no parent directory for {}", exe.display()),
            })
    }

    /// `git -C <source dir> pull --ff-only`
    #[instrument(skip(self))]
    pub fn upgrade(&self) -> ApplicationResult<PathBuf> {
        let dir = self.source_dir()?;
        if !self.fs.is_dir(&dir) {
            return Err(ApplicationError::Config {
                message: format!("source directory not found: {}", dir.display()),
            });
        }

        let git = &self.settings.tools.git;
        let dir_arg = dir.to_string_lossy().into_owned();
        let args = ["-C", dir_arg.as_str(), "pull", "--ff-only"];
        let line = command_line(git, &args);
        info!("{}", line);
        self.cmd
            .status(git, &args, &CommandOptions::default())
            .check(&line)?;
        Ok(dir)
    }
}
