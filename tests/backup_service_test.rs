//! Tests for BackupService
#![cfg(unix)]

mod common;

use std::path::Path;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use tempfile::TempDir;

use common::{test_container, test_settings, MockCommandRunner, Reply};
use stackctl::application::services::BackupOutcome;
use stackctl::application::ApplicationError;

/// Simulates tar and gpg by creating the files they would write.
fn writing_responder(cmd: &str, args: &[&str]) -> Reply {
    match cmd {
        "tar" => {
            std::fs::write(args[1], b"archive").unwrap();
            Reply::ok("")
        }
        "gpg" => {
            let output = args
                .iter()
                .position(|a| *a == "--output")
                .map(|i| args[i + 1])
                .unwrap();
            std::fs::write(output, b"encrypted").unwrap();
            Reply::ok("")
        }
        _ => Reply::ok(""),
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn noon() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
}

#[test]
fn given_no_key_when_backup_then_single_plain_archive() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path());
    let backup_dir = settings.backup_dir.clone();
    let data_dir = settings.data_dir.clone();
    let cmd = Arc::new(MockCommandRunner::with_responder(writing_responder));
    let container = test_container(settings, true, cmd.clone());

    // Act
    let outcome = container.backup_service().backup(noon()).unwrap();

    // Assert
    let archive = backup_dir.join("alpha-cluster-20240301-123005.tar.xz");
    assert_eq!(outcome, BackupOutcome::Archived(archive.clone()));
    assert_eq!(files_in(&backup_dir), vec!["alpha-cluster-20240301-123005.tar.xz"]);
    assert_eq!(
        cmd.lines(),
        vec![format!(
            "tar -cJf {} --exclude=./storage -C {} .",
            archive.display(),
            data_dir.display()
        )]
    );
}

#[test]
fn given_key_when_backup_then_only_encrypted_archive_remains() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let mut settings = test_settings(temp.path());
    settings.backup_key = Some("60A4127E".into());
    let backup_dir = settings.backup_dir.clone();
    let cmd = Arc::new(MockCommandRunner::with_responder(writing_responder));
    let container = test_container(settings, true, cmd.clone());

    // Act
    let outcome = container.backup_service().backup(noon()).unwrap();

    // Assert
    let encrypted = backup_dir.join("alpha-cluster-20240301-123005.tar.xz.gpg");
    assert_eq!(outcome, BackupOutcome::Encrypted(encrypted));
    assert_eq!(
        files_in(&backup_dir),
        vec!["alpha-cluster-20240301-123005.tar.xz.gpg"]
    );
    let gpg = &cmd.calls()[1];
    assert_eq!(gpg.cmd, "gpg");
    assert!(gpg.line().contains("--encrypt --recipient 60A4127E"));
}

#[test]
fn given_failing_archive_without_file_when_backup_then_absorbed_and_nothing_encrypted() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let mut settings = test_settings(temp.path());
    settings.backup_key = Some("60A4127E".into());
    let backup_dir = settings.backup_dir.clone();
    let cmd = Arc::new(MockCommandRunner::with_responder(|cmd, _| {
        if cmd == "tar" {
            Reply::fail(2)
        } else {
            Reply::ok("")
        }
    }));
    let container = test_container(settings, true, cmd.clone());

    // Act
    let outcome = container.backup_service().backup(noon()).unwrap();

    // Assert
    assert_eq!(outcome, BackupOutcome::ArchiveFailed);
    assert_eq!(cmd.calls().len(), 1);
    assert!(files_in(&backup_dir).is_empty());
}

#[test]
fn given_archive_written_with_nonzero_exit_when_backup_then_still_encrypted() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let mut settings = test_settings(temp.path());
    settings.backup_key = Some("60A4127E".into());
    let backup_dir = settings.backup_dir.clone();
    // GNU tar exits 1 on "file changed as we read it" but keeps the archive
    let cmd = Arc::new(MockCommandRunner::with_responder(|cmd, args| {
        let reply = writing_responder(cmd, args);
        if cmd == "tar" {
            Reply::fail(1)
        } else {
            reply
        }
    }));
    let container = test_container(settings, true, cmd.clone());

    // Act
    let outcome = container.backup_service().backup(noon()).unwrap();

    // Assert
    let encrypted = backup_dir.join("alpha-cluster-20240301-123005.tar.xz.gpg");
    assert_eq!(outcome, BackupOutcome::Encrypted(encrypted));
    assert_eq!(
        files_in(&backup_dir),
        vec!["alpha-cluster-20240301-123005.tar.xz.gpg"]
    );
    let programs: Vec<String> = cmd.calls().into_iter().map(|c| c.cmd).collect();
    assert_eq!(programs, vec!["tar", "gpg"]);
}

#[test]
fn given_failing_encryption_when_backup_then_error_and_plaintext_kept() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let mut settings = test_settings(temp.path());
    settings.backup_key = Some("60A4127E".into());
    let backup_dir = settings.backup_dir.clone();
    let cmd = Arc::new(MockCommandRunner::with_responder(|cmd, args| {
        if cmd == "gpg" {
            Reply::fail(2)
        } else {
            writing_responder(cmd, args)
        }
    }));
    let container = test_container(settings, true, cmd);

    // Act
    let result = container.backup_service().backup(noon());

    // Assert
    assert!(matches!(result, Err(ApplicationError::CommandFailed { .. })));
    assert_eq!(
        files_in(&backup_dir),
        vec!["alpha-cluster-20240301-123005.tar.xz"]
    );
}
