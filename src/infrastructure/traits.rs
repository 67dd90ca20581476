//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read raw file contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write raw content to file.
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file the current user may execute.
    fn is_executable(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Canonicalize path (resolve symlinks, make absolute).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// How a command is launched: working directory and extra environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Working directory (default: inherited)
    pub current_dir: Option<PathBuf>,
    /// Variables added on top of the inherited environment
    pub envs: Vec<(String, String)>,
    /// Start from an empty environment instead of inheriting
    pub clear_env: bool,
}

impl CommandOptions {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn with_envs(mut self, envs: Vec<(String, String)>) -> Self {
        self.envs = envs;
        self
    }

    pub fn isolated(mut self) -> Self {
        self.clear_env = true;
        self
    }
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its output.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        self.run_with(cmd, args, &CommandOptions::default())
    }

    /// Run a command with options and capture its output.
    fn run_with(&self, cmd: &str, args: &[&str], opts: &CommandOptions) -> io::Result<Output>;

    /// Run a command attached to the terminal (inherited stdio) and wait for it.
    fn status(&self, cmd: &str, args: &[&str], opts: &CommandOptions) -> io::Result<ExitStatus>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_executable(&self, path: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::metadata(path)
                .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
        }
        #[cfg(not(unix))]
        {
            path.is_file()
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    fn command(cmd: &str, args: &[&str], opts: &CommandOptions) -> std::process::Command {
        let mut command = std::process::Command::new(cmd);
        command.args(args);
        if let Some(dir) = &opts.current_dir {
            command.current_dir(dir);
        }
        if opts.clear_env {
            command.env_clear();
        }
        command.envs(opts.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command
    }
}

impl CommandRunner for RealCommandRunner {
    fn run_with(&self, cmd: &str, args: &[&str], opts: &CommandOptions) -> io::Result<Output> {
        Self::command(cmd, args, opts).output()
    }

    fn status(&self, cmd: &str, args: &[&str], opts: &CommandOptions) -> io::Result<ExitStatus> {
        Self::command(cmd, args, opts).status()
    }
}
