//! Stack resolution: user token → normalized name and directory

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Stack, StackToken};
use crate::infrastructure::traits::FileSystem;

/// Maps stack tokens to directories under the cluster-data root.
pub struct StackResolver {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl StackResolver {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Directory a token denotes, whether or not it exists.
    pub fn directory(&self, token: &StackToken) -> PathBuf {
        self.settings.data_dir.join(token.as_str())
    }

    /// Resolve a raw token into a [`Stack`].
    ///
    /// Nested tokens (`group/app`) are named by joining their components;
    /// plain tokens are named after the symlink-resolved directory.
    ///
    /// # Errors
    /// * `Domain(EmptyStackToken)` for an empty token
    /// * `Domain(StackOutsideDataRoot)` for a token containing `..`
    /// * `StackNotFound` when the directory does not exist
    pub fn resolve(&self, raw: &str, mode: Option<&str>) -> ApplicationResult<Stack> {
        let token = StackToken::parse(raw)?;
        let directory = self.directory(&token);
        if !self.fs.is_dir(&directory) {
            return Err(ApplicationError::StackNotFound(directory));
        }

        let resolved = if token.is_nested() {
            None
        } else {
            self.fs.canonicalize(&directory).ok()
        };
        let name = token.stack_name(resolved.as_deref());
        debug!(
            "resolve: token={} name={} dir={}",
            token,
            name,
            directory.display()
        );

        Ok(Stack {
            name,
            directory,
            mode: mode.filter(|m| !m.is_empty()).map(String::from),
        })
    }
}
