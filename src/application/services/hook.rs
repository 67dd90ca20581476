//! Stack bootstrap hook
//!
//! A stack may ship an executable (default `bootstrap.sh`) that prepares the
//! deployment. It runs as a separate child process in the stack directory
//! with an explicit environment: the assembled stack variables, a few
//! `STACK_*`/`CLUSTER_*` facts, and `PATH`/`HOME` from the caller. It cannot
//! alter the environment or working directory of stackctl itself.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::services::environment::AssembledEnv;
use crate::application::{ApplicationResult, ClusterContext, CommandResultExt};
use crate::config::Settings;
use crate::domain::Stack;
use crate::infrastructure::traits::{CommandOptions, CommandRunner, FileSystem};

/// Variables passed through from the caller's environment.
const PASSTHROUGH_VARS: &[&str] = &["PATH", "HOME", "USER", "LANG"];

pub struct HookRunner {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl HookRunner {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self { fs, cmd, settings }
    }

    pub fn hook_path(&self, stack: &Stack) -> PathBuf {
        stack.directory.join(&self.settings.hook_file)
    }

    /// Environment snapshot handed to the hook.
    pub fn environment(
        &self,
        stack: &Stack,
        context: &ClusterContext,
        env: &AssembledEnv,
    ) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = PASSTHROUGH_VARS
            .iter()
            .filter_map(|k| std::env::var(k).ok().map(|v| (k.to_string(), v)))
            .collect();
        vars.extend(env.variables.iter().cloned());
        vars.extend([
            ("STACK_NAME".to_string(), stack.name.clone()),
            ("STACK_MODE".to_string(), stack.mode.clone().unwrap_or_default()),
            (
                "STACK_DIR".to_string(),
                stack.directory.to_string_lossy().into_owned(),
            ),
            ("CLUSTER_ARCH".to_string(), context.arch.clone()),
            ("CLUSTER_NAME".to_string(), context.cluster_name.clone()),
            (
                "CLUSTER_DATA".to_string(),
                context.data_dir.to_string_lossy().into_owned(),
            ),
        ]);
        vars
    }

    /// Run the hook if the stack has one. Returns whether it ran.
    ///
    /// A hook file without execute permission is skipped with a warning; a
    /// hook exiting non-zero aborts the deploy.
    pub fn run(
        &self,
        stack: &Stack,
        context: &ClusterContext,
        env: &AssembledEnv,
    ) -> ApplicationResult<bool> {
        let hook = self.hook_path(stack);
        if !self.fs.exists(&hook) {
            return Ok(false);
        }
        if !self.fs.is_executable(&hook) {
            warn!("hook not executable, skipping: {}", hook.display());
            return Ok(false);
        }

        let program = hook.to_string_lossy().into_owned();
        info!("running hook {}", program);
        let opts = CommandOptions::in_dir(&stack.directory)
            .with_envs(self.environment(stack, context, env))
            .isolated();
        self.cmd.status(&program, &[], &opts).check(&program)?;
        Ok(true)
    }
}
