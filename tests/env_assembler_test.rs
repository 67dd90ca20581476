//! Tests for EnvAssembler
#![cfg(unix)]

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use common::test_settings;
use stackctl::application::services::EnvAssembler;
use stackctl::config::Settings;
use stackctl::domain::{EnvLayer, Stack};
use stackctl::infrastructure::traits::RealFileSystem;

fn stack(settings: &Settings, name: &str, mode: Option<&str>) -> Stack {
    let directory = settings.data_dir.join(name);
    std::fs::create_dir_all(&directory).unwrap();
    Stack {
        name: name.to_string(),
        directory,
        mode: mode.map(String::from),
    }
}

fn assembler(settings: Settings) -> EnvAssembler {
    EnvAssembler::new(Arc::new(RealFileSystem), Arc::new(settings))
}

#[test]
fn given_all_layers_when_assemble_then_concatenated_in_order() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path());
    let web = stack(&settings, "web", Some("prod"));
    std::fs::write(settings.data_dir.join("env"), "TZ=UTC\n").unwrap();
    std::fs::write(web.directory.join("env"), "IMAGE=nginx\n").unwrap();
    std::fs::write(web.directory.join("env.armhf"), "IMAGE=arm32v7/nginx\n").unwrap();
    std::fs::write(web.directory.join("env.prod"), "REPLICAS=3\n").unwrap();

    // Act
    let env = assembler(settings).assemble(&web, "armhf").unwrap();

    // Assert
    let content = std::fs::read_to_string(web.directory.join(".env")).unwrap();
    assert_eq!(
        content,
        "TZ=UTC\nIMAGE=nginx\nIMAGE=arm32v7/nginx\nREPLICAS=3\n"
    );
    let layers: Vec<EnvLayer> = env.sources.iter().map(|s| s.layer).collect();
    assert_eq!(
        layers,
        vec![
            EnvLayer::Global,
            EnvLayer::Stack,
            EnvLayer::Arch,
            EnvLayer::Mode
        ]
    );
    assert_eq!(
        env.variables,
        vec![
            ("TZ".to_string(), "UTC".to_string()),
            ("IMAGE".to_string(), "arm32v7/nginx".to_string()),
            ("REPLICAS".to_string(), "3".to_string()),
        ]
    );
}

#[test]
fn given_source_without_trailing_newline_when_assemble_then_lines_do_not_fuse() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path());
    let web = stack(&settings, "web", None);
    std::fs::write(settings.data_dir.join("env"), "A=1").unwrap();
    std::fs::write(web.directory.join("env"), "B=2\n").unwrap();

    // Act
    assembler(settings).assemble(&web, "x86_64").unwrap();

    // Assert
    let content = std::fs::read_to_string(web.directory.join(".env")).unwrap();
    assert_eq!(content, "A=1\nB=2\n");
}

#[test]
fn given_no_mode_when_assemble_then_mode_file_ignored() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path());
    let web = stack(&settings, "web", None);
    std::fs::write(web.directory.join("env"), "A=1\n").unwrap();
    std::fs::write(web.directory.join("env.prod"), "A=2\n").unwrap();

    // Act
    let env = assembler(settings).assemble(&web, "x86_64").unwrap();

    // Assert
    assert_eq!(env.sources.len(), 1);
    assert_eq!(
        std::fs::read_to_string(web.directory.join(".env")).unwrap(),
        "A=1\n"
    );
}

#[test]
fn given_existing_env_when_assemble_twice_then_identical_output() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path());
    let web = stack(&settings, "web", None);
    std::fs::write(web.directory.join(".env"), "STALE=1\n").unwrap();
    std::fs::write(web.directory.join("env"), "A=1\n").unwrap();
    let assembler = assembler(settings);

    // Act
    assembler.assemble(&web, "x86_64").unwrap();
    let first = std::fs::read_to_string(web.directory.join(".env")).unwrap();
    assembler.assemble(&web, "x86_64").unwrap();
    let second = std::fs::read_to_string(web.directory.join(".env")).unwrap();

    // Assert
    assert_eq!(first, "A=1\n");
    assert_eq!(first, second);
}

#[test]
fn given_no_sources_when_assemble_then_empty_env_file() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path());
    let web = stack(&settings, "web", None);

    // Act
    let env = assembler(settings).assemble(&web, "x86_64").unwrap();

    // Assert
    assert!(env.sources.is_empty());
    assert!(env.variables.is_empty());
    assert_eq!(std::fs::read_to_string(&env.path).unwrap(), "");
}

#[test]
fn given_non_utf8_byte_when_assemble_then_passed_through_verbatim() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path());
    let web = stack(&settings, "web", None);
    std::fs::write(settings.data_dir.join("env"), b"GREETING=caf\xe9").unwrap();
    std::fs::write(web.directory.join("env"), "A=1\n").unwrap();

    // Act
    let env = assembler(settings).assemble(&web, "x86_64").unwrap();

    // Assert
    assert_eq!(
        std::fs::read(&env.path).unwrap(),
        b"GREETING=caf\xe9\nA=1\n"
    );
    assert_eq!(
        env.variables,
        vec![
            ("GREETING".to_string(), "caf\u{FFFD}".to_string()),
            ("A".to_string(), "1".to_string()),
        ]
    );
}
