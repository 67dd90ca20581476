//! Domain entities: core data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::envfile::ASSEMBLED_ENV_FILE;
use crate::domain::DomainError;

/// Replaces path separators when a nested stack token becomes a stack name.
pub const NAME_JOINER: char = '-';

/// Directory inside a stack that is created on deploy when missing.
pub const VOLUMES_DIR: &str = "volumes";

/// A deployable stack directory under the cluster-data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    /// Normalized name, used as swarm stack / compose project identifier
    pub name: String,
    /// Absolute path of the stack directory
    pub directory: PathBuf,
    /// Deployment profile, selects `env.<mode>`
    pub mode: Option<String>,
}

impl Stack {
    /// Path of the assembled environment file.
    pub fn env_file(&self) -> PathBuf {
        self.directory.join(ASSEMBLED_ENV_FILE)
    }

    pub fn volumes_dir(&self) -> PathBuf {
        self.directory.join(VOLUMES_DIR)
    }
}

/// Stack identifier as typed by the user.
///
/// Empty and `.` path components are dropped, so `./web/`, `/web` and `web`
/// all denote the same stack and `infra//app` equals `infra/app`. `..` is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackToken(String);

impl StackToken {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        let components: Vec<&str> = raw
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();
        if components.contains(&"..") {
            return Err(DomainError::StackOutsideDataRoot(raw.to_string()));
        }
        if components.is_empty() {
            return Err(DomainError::EmptyStackToken);
        }
        Ok(Self(components.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the token addresses a nested directory (`group/app`).
    pub fn is_nested(&self) -> bool {
        self.0.contains('/')
    }

    /// Stack name for a token.
    ///
    /// Nested tokens are joined with [`NAME_JOINER`] and never consult the
    /// filesystem. Plain tokens take the last component of `resolved`, the
    /// stack directory with symlinks resolved; without it the token is used.
    pub fn stack_name(&self, resolved: Option<&Path>) -> String {
        if self.is_nested() {
            return self.0.replace('/', &NAME_JOINER.to_string());
        }
        resolved
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.clone())
    }
}

impl fmt::Display for StackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a host machine type (`uname -m`) into the tag used for `env.<arch>`.
pub fn normalize_arch(machine: &str) -> String {
    let machine = machine.trim();
    if machine.starts_with("armv") {
        "armhf".to_string()
    } else {
        machine.to_string()
    }
}

/// Listing queries supported by `--list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Services,
    Tasks,
    Stacks,
    Nodes,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Services => "services",
            ListKind::Tasks => "tasks",
            ListKind::Stacks => "stacks",
            ListKind::Nodes => "nodes",
        }
    }
}

impl FromStr for ListKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "services" | "service" => Ok(ListKind::Services),
            "tasks" | "task" => Ok(ListKind::Tasks),
            "stacks" | "stack" => Ok(ListKind::Stacks),
            "nodes" | "node" => Ok(ListKind::Nodes),
            _ => Err(DomainError::UnknownListKind(s.to_string())),
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of `--balance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceTarget {
    All,
    Service(String),
}

impl From<&str> for BalanceTarget {
    fn from(s: &str) -> Self {
        if s == "all" {
            BalanceTarget::All
        } else {
            BalanceTarget::Service(s.to_string())
        }
    }
}

/// Extension of backup archives.
pub const ARCHIVE_EXTENSION: &str = "tar.xz";

/// Extension appended to encrypted backup archives.
pub const ENCRYPTED_EXTENSION: &str = "gpg";

/// `<cluster>-cluster-<timestamp>.tar.xz`
pub fn archive_file_name(cluster_name: &str, timestamp: &str) -> String {
    format!("{cluster_name}-cluster-{timestamp}.{ARCHIVE_EXTENSION}")
}

/// Path of the encrypted counterpart of an archive (`<archive>.gpg`).
pub fn encrypted_path(archive: &Path) -> PathBuf {
    let mut name = archive.as_os_str().to_os_string();
    name.push(".");
    name.push(ENCRYPTED_EXTENSION);
    PathBuf::from(name)
}
