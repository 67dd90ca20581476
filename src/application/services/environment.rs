//! Environment assembly service
//!
//! Concatenates the global, stack, architecture and mode env files into the
//! stack's `.env`, which the orchestrator's variable substitution consumes.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{concat_sources, env_sources, parse_env_vars, EnvSource, Stack};
use crate::infrastructure::traits::FileSystem;

/// Result of assembling a stack environment.
#[derive(Debug, Clone)]
pub struct AssembledEnv {
    /// The written `.env` file
    pub path: PathBuf,
    /// Sources that existed, in concatenation order
    pub sources: Vec<EnvSource>,
    /// Effective variables (last assignment wins)
    pub variables: Vec<(String, String)>,
}

/// Service writing the assembled `.env` of a stack.
pub struct EnvAssembler {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl EnvAssembler {
    /// Create a new environment assembler.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Recreate `<stack>/.env` from the layered sources.
    ///
    /// The previous file is deleted first, so repeated runs never accumulate
    /// content. Missing sources are skipped. Contents are copied as bytes and
    /// never validated; only the variable view is decoded (lossily).
    pub fn assemble(&self, stack: &Stack, arch: &str) -> ApplicationResult<AssembledEnv> {
        let target = stack.env_file();
        debug!("assemble: stack={} target={}", stack.name, target.display());

        if self.fs.exists(&target) {
            self.fs
                .remove_file(&target)
                .with_path_context("remove assembled env", &target)?;
        }

        let global = self.settings.global_env_path();
        let mut sources = Vec::new();
        let mut contents = Vec::new();
        for source in env_sources(&global, &stack.directory, arch, stack.mode.as_deref()) {
            if !self.fs.is_file(&source.path) {
                continue;
            }
            let content = self
                .fs
                .read(&source.path)
                .with_path_context("read env source", &source.path)?;
            debug!("assemble: + {:?} {}", source.layer, source.path.display());
            contents.push(content);
            sources.push(source);
        }

        let assembled = concat_sources(contents.iter().map(Vec::as_slice));
        self.fs
            .write(&target, &assembled)
            .with_path_context("write assembled env", &target)?;

        Ok(AssembledEnv {
            path: target,
            sources,
            variables: parse_env_vars(&String::from_utf8_lossy(&assembled)),
        })
    }
}
