//! Cluster-data backup: tar.xz archive, optionally gpg-encrypted
//!
//! A failing archive step is logged and absorbed; whatever archive it left
//! behind is still encrypted. Encryption failures are not absorbed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{info, instrument, warn};

use crate::application::{
    command_line, ApplicationResult, ClusterContext, CommandResultExt, IoResultExt,
};
use crate::config::Settings;
use crate::domain::{archive_file_name, encrypted_path};
use crate::infrastructure::traits::{CommandOptions, CommandRunner, FileSystem};

/// Timestamp layout embedded in archive names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Plaintext archive written (no backup key configured)
    Archived(PathBuf),
    /// Encrypted archive written, plaintext removed
    Encrypted(PathBuf),
    /// `tar` failed without leaving an archive
    ArchiveFailed,
}

pub struct BackupService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    context: Arc<ClusterContext>,
}

impl BackupService {
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

    /// Archive path for a backup taken at `now`.
    pub fn archive_path(&self, now: DateTime<Local>) -> PathBuf {
        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        self.settings
            .backup_dir
            .join(archive_file_name(&self.context.cluster_name, &stamp))
    }

    /// Archive the cluster-data root into the backup directory.
    ///
    /// With a backup key the archive is encrypted to that recipient and the
    /// plaintext removed. A non-zero `tar` exit (GNU tar exits 1 when files
    /// change while being read) only matters when no archive was written.
    #[instrument(skip(self))]
    pub fn backup(&self, now: DateTime<Local>) -> ApplicationResult<BackupOutcome> {
        let backup_dir = &self.settings.backup_dir;
        if !self.fs.is_dir(backup_dir) {
            self.fs
                .create_dir_all(backup_dir)
                .with_path_context("create backup dir", backup_dir)?;
        }

        let archive = self.archive_path(now);
        if let Err(e) = self.archive(&archive) {
            warn!("backup: archive step failed: {}", e);
            if !self.fs.is_file(&archive) {
                return Ok(BackupOutcome::ArchiveFailed);
            }
        }
        info!("backup: wrote {}", archive.display());

        let Some(key) = self.settings.backup_key.as_deref() else {
            return Ok(BackupOutcome::Archived(archive));
        };

        let encrypted = self.encrypt(&archive, key)?;
        self.fs
            .remove_file(&archive)
            .with_path_context("remove plaintext archive", &archive)?;
        info!("backup: encrypted to {}", encrypted.display());
        Ok(BackupOutcome::Encrypted(encrypted))
    }

    fn archive(&self, archive: &Path) -> ApplicationResult<()> {
        let tar = &self.settings.tools.tar;
        let archive_arg = archive.to_string_lossy().into_owned();
        let data_arg = self.context.data_dir.to_string_lossy().into_owned();
        let excludes: Vec<String> = self
            .settings
            .backup_exclude
            .iter()
            .map(|p| format!("--exclude=./{}", p.trim_start_matches("./")))
            .collect();

        let mut args: Vec<&str> = vec!["-cJf", archive_arg.as_str()];
        args.extend(excludes.iter().map(String::as_str));
        args.extend(["-C", data_arg.as_str(), "."]);

        let line = command_line(tar, &args);
        info!("{}", line);
        self.cmd
            .status(tar, &args, &CommandOptions::default())
            .check(&line)
    }

    fn encrypt(&self, archive: &Path, key: &str) -> ApplicationResult<PathBuf> {
        let gpg = &self.settings.tools.gpg;
        let target = encrypted_path(archive);
        let archive_arg = archive.to_string_lossy().into_owned();
        let target_arg = target.to_string_lossy().into_owned();
        let args = [
            "--batch",
            "--yes",
            "--encrypt",
            "--recipient",
            key,
            "--output",
            target_arg.as_str(),
            archive_arg.as_str(),
        ];

        let line = command_line(gpg, &args);
        info!("{}", line);
        self.cmd
            .status(gpg, &args, &CommandOptions::default())
            .check(&line)?;
        Ok(target)
    }
}
