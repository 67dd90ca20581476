//! Cluster-wide operations: list, balance, logs, stats
//!
//! Everything except `stats` needs swarm mode.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{
    command_line, ApplicationError, ApplicationResult, ClusterContext, CommandResultExt,
};
use crate::config::Settings;
use crate::domain::{sort_table, BalanceTarget, ListKind, SortColumn};
use crate::infrastructure::traits::{CommandOptions, CommandRunner};

/// A node whose container statistics are shown by `--stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsTarget {
    pub node: String,
    /// `true` when the node is this host (no ssh hop)
    pub local: bool,
}

pub struct ClusterService {
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    context: Arc<ClusterContext>,
}

impl ClusterService {
    pub fn new(
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
        context: Arc<ClusterContext>,
    ) -> Self {
        Self {
            cmd,
            settings,
            context,
        }
    }

    fn require_swarm(&self, operation: &str) -> ApplicationResult<()> {
        if self.context.swarm {
            Ok(())
        } else {
            Err(ApplicationError::SwarmRequired(operation.to_string()))
        }
    }

    fn docker(&self) -> &str {
        &self.settings.tools.docker
    }

    /// Capture stdout of a docker invocation, failing on non-zero exit.
    fn capture(&self, args: &[&str]) -> ApplicationResult<String> {
        let line = command_line(self.docker(), args);
        debug!("capture: {}", line);
        let output = self.cmd.run(self.docker(), args).check(&line)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a docker invocation attached to the terminal.
    fn attach(&self, program: &str, args: &[&str]) -> ApplicationResult<()> {
        let line = command_line(program, args);
        info!("{}", line);
        self.cmd
            .status(program, args, &CommandOptions::default())
            .check(&line)
    }

    /// Tabular listing of services, running tasks, stacks or nodes, sorted by
    /// `sort` with the header row kept first.
    #[instrument(skip(self))]
    pub fn list(&self, kind: ListKind, sort: &SortColumn) -> ApplicationResult<String> {
        self.require_swarm(&format!("--list {kind}"))?;

        let table = match kind {
            ListKind::Services => self.capture(&["service", "ls"])?,
            ListKind::Stacks => self.capture(&["stack", "ls"])?,
            ListKind::Nodes => self.capture(&["node", "ls"])?,
            ListKind::Tasks => {
                let ids = self.capture(&["service", "ls", "-q"])?;
                let ids: Vec<&str> = ids.split_whitespace().collect();
                if ids.is_empty() {
                    debug!("list: no services, no tasks");
                    return Ok(String::new());
                }
                let mut args = vec!["service", "ps", "--filter", "desired-state=running"];
                args.extend(ids);
                self.capture(&args)?
            }
        };

        Ok(sort_table(&table, sort)?)
    }

    /// Force a redeploy of one service or of every service, one after the
    /// other. Returns the services touched, in order.
    #[instrument(skip(self))]
    pub fn balance(&self, target: &BalanceTarget) -> ApplicationResult<Vec<String>> {
        self.require_swarm("--balance")?;

        let services = match target {
            BalanceTarget::Service(name) => vec![name.clone()],
            BalanceTarget::All => self
                .capture(&["service", "ls", "--format", "{{.Name}}"])?
                .lines()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        };

        for service in &services {
            self.attach(self.docker(), &["service", "update", "--force", service.as_str()])?;
        }
        Ok(services)
    }

    /// Follow the logs of a service until interrupted.
    #[instrument(skip(self))]
    pub fn logs(&self, service: &str) -> ApplicationResult<()> {
        self.require_swarm("--logs")?;
        self.attach(self.docker(), &["service", "logs", "--follow", service])
    }

    /// Nodes to query for `--stats`: every swarm node, or just this host.
    pub fn stats_targets(&self) -> ApplicationResult<Vec<StatsTarget>> {
        if !self.context.swarm {
            return Ok(vec![StatsTarget {
                node: self.context.hostname.clone(),
                local: true,
            }]);
        }

        let nodes = self.capture(&["node", "ls", "--format", "{{.Hostname}}"])?;
        Ok(nodes
            .lines()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|node| StatsTarget {
                node: node.to_string(),
                local: node == self.context.hostname,
            })
            .collect())
    }

    /// One-shot container statistics of a node, remote nodes via ssh.
    #[instrument(skip(self))]
    pub fn stats_node(&self, target: &StatsTarget) -> ApplicationResult<()> {
        if target.local {
            self.attach(self.docker(), &["stats", "--no-stream"])
        } else {
            self.attach(
                &self.settings.tools.ssh,
                &[target.node.as_str(), self.docker(), "stats", "--no-stream"],
            )
        }
    }
}
