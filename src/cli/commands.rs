//! Command dispatch: flags → operation → service call

use std::io;

use chrono::Local;
use clap::{Command, CommandFactory};
use clap_complete::{generate, Generator, Shell};
use tracing::{debug, instrument};

use crate::application::services::{BackupOutcome, Lifecycle};
use crate::application::ApplicationError;
use crate::cli::args::Cli;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::domain::{BalanceTarget, ListKind, SortColumn};
use crate::infrastructure::di::ServiceContainer;

/// The single operation requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Deploy { stack: String, mode: Option<String> },
    Lifecycle { verb: Lifecycle, stack: String },
    List { kind: ListKind, sort: SortColumn },
    Stats,
    Backup,
    Logs { service: String },
    Balance(BalanceTarget),
    Upgrade,
    Info,
    Completion(Shell),
}

fn required(values: &[String], flag: &str, what: &str) -> CliResult<String> {
    values
        .first()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| CliError::Usage(format!("{flag} requires {what}")))
}

impl Cli {
    /// Translate the parsed flags into an [`Operation`].
    ///
    /// # Errors
    /// * `CliError::Help` when help is requested or no operation is given
    /// * `CliError::Usage` when an operation lacks its argument or gets a bad one
    pub fn operation(&self) -> CliResult<Operation> {
        if self.help {
            return Err(CliError::Help);
        }
        if let Some(values) = &self.deploy {
            return Ok(Operation::Deploy {
                stack: required(values, "--deploy", "a stack")?,
                mode: values.get(1).filter(|m| !m.trim().is_empty()).cloned(),
            });
        }
        for (flag, values, verb) in [
            ("--remove", &self.remove, Lifecycle::Remove),
            ("--start", &self.start, Lifecycle::Start),
            ("--stop", &self.stop, Lifecycle::Stop),
        ] {
            if let Some(values) = values {
                return Ok(Operation::Lifecycle {
                    verb,
                    stack: required(values, flag, "a stack")?,
                });
            }
        }
        if let Some(values) = &self.list {
            let kind = required(values, "--list", "services, tasks, stacks or nodes")?
                .parse::<ListKind>()
                .map_err(|e| CliError::Usage(e.to_string()))?;
            let sort = values
                .get(1)
                .map(|s| s.parse::<SortColumn>())
                .transpose()
                .map_err(|e| CliError::Usage(e.to_string()))?
                .unwrap_or_default();
            return Ok(Operation::List { kind, sort });
        }
        if self.stats {
            return Ok(Operation::Stats);
        }
        if self.backup {
            return Ok(Operation::Backup);
        }
        if let Some(values) = &self.logs {
            return Ok(Operation::Logs {
                service: required(values, "--logs", "a service")?,
            });
        }
        if let Some(values) = &self.balance {
            let target = required(values, "--balance", "a service or 'all'")?;
            return Ok(Operation::Balance(BalanceTarget::from(target.as_str())));
        }
        if self.upgrade {
            return Ok(Operation::Upgrade);
        }
        if self.info {
            return Ok(Operation::Info);
        }
        if let Some(shell) = self.completion {
            return Ok(Operation::Completion(shell));
        }
        Err(CliError::Help)
    }
}

/// Usage text as printed for `--help` and usage errors.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

pub fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[instrument(skip(container))]
pub fn execute_command(operation: &Operation, container: &ServiceContainer) -> CliResult<()> {
    debug!("context: {:?}", container.context);
    match operation {
        Operation::Deploy { stack, mode } => deploy(container, stack, mode.as_deref()),
        Operation::Lifecycle { verb, stack } => lifecycle(container, *verb, stack),
        Operation::List { kind, sort } => list(container, *kind, sort),
        Operation::Stats => stats(container),
        Operation::Backup => backup(container),
        Operation::Logs { service } => {
            container.cluster_service().logs(service)?;
            Ok(())
        }
        Operation::Balance(target) => balance(container, target),
        Operation::Upgrade => {
            let dir = container.upgrade_service().upgrade()?;
            output::success(&format!("updated {}", dir.display()));
            Ok(())
        }
        Operation::Info => info(container),
        Operation::Completion(shell) => {
            print_completions(*shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn deploy(container: &ServiceContainer, stack: &str, mode: Option<&str>) -> CliResult<()> {
    let deployment = container.stack_service().deploy(stack, mode)?;
    for source in &deployment.env.sources {
        debug!("env source: {}", source.path.display());
    }
    if deployment.hook_ran {
        output::success_detail("bootstrap hook");
    }
    output::success(&format!(
        "deployed {} ({})",
        deployment.stack.name,
        deployment.descriptor.display()
    ));
    Ok(())
}

fn lifecycle(container: &ServiceContainer, verb: Lifecycle, stack: &str) -> CliResult<()> {
    let stack = container.stack_service().lifecycle(verb, stack)?;
    let done = match verb {
        Lifecycle::Remove => "removed",
        Lifecycle::Start => "started",
        Lifecycle::Stop => "stopped",
    };
    output::success(&format!("{} {}", done, stack.name));
    Ok(())
}

fn list(container: &ServiceContainer, kind: ListKind, sort: &SortColumn) -> CliResult<()> {
    let table = container.cluster_service().list(kind, sort)?;
    if !table.is_empty() {
        output::info(table.trim_end());
    }
    Ok(())
}

fn stats(container: &ServiceContainer) -> CliResult<()> {
    let service = container.cluster_service();
    for target in service.stats_targets()? {
        output::header(&target.node);
        service.stats_node(&target)?;
    }
    Ok(())
}

fn backup(container: &ServiceContainer) -> CliResult<()> {
    match container.backup_service().backup(Local::now())? {
        BackupOutcome::Archived(path) => output::action("Archived", &path.display()),
        BackupOutcome::Encrypted(path) => output::action("Encrypted", &path.display()),
        BackupOutcome::ArchiveFailed => output::warning("archive step failed, no archive written"),
    }
    Ok(())
}

fn balance(container: &ServiceContainer, target: &BalanceTarget) -> CliResult<()> {
    let services = container.cluster_service().balance(target)?;
    for service in &services {
        output::success_detail(service);
    }
    output::success(&format!("rebalanced {} service(s)", services.len()));
    Ok(())
}

fn info(container: &ServiceContainer) -> CliResult<()> {
    let context = toml::to_string_pretty(container.context.as_ref()).map_err(|e| {
        ApplicationError::Config {
            message: format!("serialize context: {e}"),
        }
    })?;
    output::header("Cluster");
    output::info(context.trim_end());

    output::header("Settings");
    output::info(container.settings.to_toml()?.trim_end());
    Ok(())
}
