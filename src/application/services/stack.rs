//! Stack lifecycle: deploy, remove, start, stop
//!
//! Every operation runs in the stack directory and issues one orchestrator
//! invocation, `docker stack ...` in swarm mode, `docker compose ...` otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::environment::{AssembledEnv, EnvAssembler};
use crate::application::services::hook::HookRunner;
use crate::application::services::resolver::StackResolver;
use crate::application::{
    command_line, ApplicationError, ApplicationResult, ClusterContext, CommandResultExt,
    IoResultExt,
};
use crate::config::Settings;
use crate::domain::Stack;
use crate::infrastructure::traits::{CommandOptions, CommandRunner, FileSystem};

/// Lifecycle verbs sharing the same swarm/compose shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Remove,
    Start,
    Stop,
}

impl Lifecycle {
    fn stack_verb(&self) -> &'static str {
        match self {
            Lifecycle::Remove => "rm",
            Lifecycle::Start => "start",
            Lifecycle::Stop => "stop",
        }
    }

    fn compose_verb(&self) -> &'static str {
        match self {
            Lifecycle::Remove => "down",
            Lifecycle::Start => "start",
            Lifecycle::Stop => "stop",
        }
    }
}

/// Outcome of a deploy, for reporting.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub stack: Stack,
    pub descriptor: PathBuf,
    pub env: AssembledEnv,
    pub hook_ran: bool,
}

pub struct StackService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    context: Arc<ClusterContext>,
}

impl StackService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
        context: Arc<ClusterContext>,
    ) -> Self {
        Self {
            fs,
            cmd,
            settings,
            context,
        }
    }

    fn resolver(&self) -> StackResolver {
        StackResolver::new(self.fs.clone(), self.settings.clone())
    }

    /// First existing descriptor candidate in the stack directory.
    pub fn descriptor(&self, stack: &Stack) -> ApplicationResult<PathBuf> {
        self.settings
            .descriptor_files
            .iter()
            .map(|name| stack.directory.join(name))
            .find(|path| self.fs.is_file(path))
            .ok_or_else(|| ApplicationError::DescriptorNotFound {
                dir: stack.directory.clone(),
                candidates: self.settings.descriptor_files.join(", "),
            })
    }

    /// Deploy a stack.
    ///
    /// Steps: resolve, locate descriptor, create `volumes/`, assemble `.env`,
    /// run the bootstrap hook, invoke the orchestrator with the assembled
    /// variables in its environment.
    #[instrument(skip(self))]
    pub fn deploy(&self, token: &str, mode: Option<&str>) -> ApplicationResult<Deployment> {
        let stack = self.resolver().resolve(token, mode)?;
        let descriptor = self.descriptor(&stack)?;

        let volumes = stack.volumes_dir();
        if !self.fs.is_dir(&volumes) {
            debug!("deploy: creating {}", volumes.display());
            self.fs
                .create_dir_all(&volumes)
                .with_path_context("create volumes dir", &volumes)?;
        }

        let env = EnvAssembler::new(self.fs.clone(), self.settings.clone())
            .assemble(&stack, &self.context.arch)?;

        let hook_ran = HookRunner::new(self.fs.clone(), self.cmd.clone(), self.settings.clone())
            .run(&stack, &self.context, &env)?;

        let descriptor_arg = descriptor.to_string_lossy().into_owned();
        let args: Vec<&str> = if self.context.swarm {
            vec![
                "stack",
                "deploy",
                "--with-registry-auth",
                "--resolve-image",
                "never",
                "-c",
                descriptor_arg.as_str(),
                stack.name.as_str(),
            ]
        } else {
            vec![
                "compose",
                "-p",
                stack.name.as_str(),
                "-f",
                descriptor_arg.as_str(),
                "up",
                "-d",
            ]
        };
        let opts = CommandOptions::in_dir(&stack.directory).with_envs(env.variables.clone());
        self.invoke(&args, &opts)?;

        Ok(Deployment {
            stack,
            descriptor,
            env,
            hook_ran,
        })
    }

    /// Remove, start or stop a stack.
    #[instrument(skip(self))]
    pub fn lifecycle(&self, verb: Lifecycle, token: &str) -> ApplicationResult<Stack> {
        let stack = self.resolver().resolve(token, None)?;
        let args: Vec<&str> = if self.context.swarm {
            vec!["stack", verb.stack_verb(), stack.name.as_str()]
        } else {
            vec!["compose", "-p", stack.name.as_str(), verb.compose_verb()]
        };
        self.invoke(&args, &CommandOptions::in_dir(&stack.directory))?;
        Ok(stack)
    }

    fn invoke(&self, args: &[&str], opts: &CommandOptions) -> ApplicationResult<()> {
        let docker = &self.settings.tools.docker;
        let line = command_line(docker, args);
        info!("{}", line);
        self.cmd.status(docker, args, opts).check(&line)
    }
}
