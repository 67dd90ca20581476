//! Cluster-wide context detected once at startup
//!
//! Handlers receive the context by reference; nothing re-probes the host mid-run.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::domain::normalize_arch;
use crate::infrastructure::traits::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterContext {
    /// Architecture tag selecting `env.<arch>`
    pub arch: String,
    /// Swarm manager reachable (`docker node ls` succeeded)
    pub swarm: bool,
    pub cluster_name: String,
    /// Name of this host, compared against node host names by `--stats`
    pub hostname: String,
    pub data_dir: PathBuf,
}

impl ClusterContext {
    /// Probe the host: machine type, swarm mode, host name.
    pub fn detect(settings: &Settings, cmd: &dyn CommandRunner) -> Self {
        let arch = detect_arch(cmd);
        let swarm = detect_swarm(&settings.tools.docker, cmd);
        let hostname = local_hostname();
        let context = Self::from_parts(settings, arch, swarm, hostname);
        debug!("detect: {:?}", context);
        context
    }

    /// Assemble a context from already known facts.
    pub fn from_parts(
        settings: &Settings,
        arch: impl Into<String>,
        swarm: bool,
        hostname: impl Into<String>,
    ) -> Self {
        let hostname = hostname.into();
        let cluster_name = settings
            .cluster_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| hostname.clone());
        Self {
            arch: arch.into(),
            swarm,
            cluster_name,
            hostname,
            data_dir: settings.data_dir.clone(),
        }
    }
}

fn detect_arch(cmd: &dyn CommandRunner) -> String {
    match cmd.run("uname", &["-m"]) {
        Ok(out) if out.status.success() => normalize_arch(&String::from_utf8_lossy(&out.stdout)),
        _ => {
            warn!("uname -m failed, using compile-time architecture");
            normalize_arch(std::env::consts::ARCH)
        }
    }
}

fn detect_swarm(docker: &str, cmd: &dyn CommandRunner) -> bool {
    cmd.run(docker, &["node", "ls", "-q"])
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}
