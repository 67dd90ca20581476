//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>` or `$XDG_CONFIG_HOME/stackctl/stackctl.toml`
//! 3. Environment variables: `STACKCTL_*` prefix
//! 4. Environment variables: `CLUSTER_DATA`, `CLUSTER_BACKUP`, `CLUSTER_NAME`, `CLUSTER_BACKUP_KEY`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// External programs the operations delegate to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub docker: String,
    pub ssh: String,
    pub git: String,
    pub tar: String,
    pub gpg: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            docker: "docker".into(),
            ssh: "ssh".into(),
            git: "git".into(),
            tar: "tar".into(),
            gpg: "gpg".into(),
        }
    }
}

/// Raw tools config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawToolsConfig {
    pub docker: Option<String>,
    pub ssh: Option<String>,
    pub git: Option<String>,
    pub tar: Option<String>,
    pub gpg: Option<String>,
}

impl ToolsConfig {
    fn merge(&self, overlay: &RawToolsConfig) -> Self {
        Self {
            docker: overlay.docker.clone().unwrap_or_else(|| self.docker.clone()),
            ssh: overlay.ssh.clone().unwrap_or_else(|| self.ssh.clone()),
            git: overlay.git.clone().unwrap_or_else(|| self.git.clone()),
            tar: overlay.tar.clone().unwrap_or_else(|| self.tar.clone()),
            gpg: overlay.gpg.clone().unwrap_or_else(|| self.gpg.clone()),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub cluster_name: Option<String>,
    pub backup_key: Option<String>,
    pub backup_exclude: Option<Vec<String>>,
    pub global_env_file: Option<String>,
    pub descriptor_files: Option<Vec<String>>,
    pub hook_file: Option<String>,
    pub source_dir: Option<PathBuf>,
    #[serde(default)]
    pub tools: RawToolsConfig,
}

/// Unified configuration for stackctl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Cluster-data root holding every stack directory
    pub data_dir: PathBuf,
    /// Directory receiving backup archives
    pub backup_dir: PathBuf,
    /// Cluster name (default: host name)
    pub cluster_name: Option<String>,
    /// GPG recipient; backups are encrypted when set
    pub backup_key: Option<String>,
    /// Paths below `data_dir` left out of backups
    pub backup_exclude: Vec<String>,
    /// Global environment file, relative to `data_dir` unless absolute
    pub global_env_file: String,
    /// Orchestration descriptor candidates, first existing one wins
    pub descriptor_files: Vec<String>,
    /// Executable run in the stack directory before deploy
    pub hook_file: String,
    /// Checkout updated by `--upgrade` (default: directory of the executable)
    pub source_dir: Option<PathBuf>,
    pub tools: ToolsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/srv/cluster"),
            backup_dir: PathBuf::from("/srv/backup"),
            cluster_name: None,
            backup_key: None,
            backup_exclude: vec!["storage".into()],
            global_env_file: "env".into(),
            descriptor_files: vec![
                "docker-compose.yml".into(),
                "docker-compose.yaml".into(),
                "compose.yml".into(),
                "compose.yaml".into(),
                "stack.yml".into(),
            ],
            hook_file: "bootstrap.sh".into(),
            source_dir: None,
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the XDG config directory for stackctl.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "stackctl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("stackctl.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Settings {
    /// Absolute path of the global environment file.
    pub fn global_env_path(&self) -> PathBuf {
        self.data_dir.join(&self.global_env_file)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.data_dir = PathBuf::from(expand_env_vars(&self.data_dir.to_string_lossy()));
        self.backup_dir = PathBuf::from(expand_env_vars(&self.backup_dir.to_string_lossy()));
        self.source_dir = self
            .source_dir
            .as_ref()
            .map(|p| PathBuf::from(expand_env_vars(&p.to_string_lossy())));
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            backup_dir: overlay
                .backup_dir
                .clone()
                .unwrap_or_else(|| self.backup_dir.clone()),
            cluster_name: overlay
                .cluster_name
                .clone()
                .or_else(|| self.cluster_name.clone()),
            backup_key: overlay.backup_key.clone().or_else(|| self.backup_key.clone()),
            backup_exclude: overlay
                .backup_exclude
                .clone()
                .unwrap_or_else(|| self.backup_exclude.clone()),
            global_env_file: overlay
                .global_env_file
                .clone()
                .unwrap_or_else(|| self.global_env_file.clone()),
            descriptor_files: overlay
                .descriptor_files
                .clone()
                .unwrap_or_else(|| self.descriptor_files.clone()),
            hook_file: overlay
                .hook_file
                .clone()
                .unwrap_or_else(|| self.hook_file.clone()),
            source_dir: overlay.source_dir.clone().or_else(|| self.source_dir.clone()),
            tools: self.tools.merge(&overlay.tools),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given.
    ///   Without it the XDG config file is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file
        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        debug!("load: global config {}", global_path.display());
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        // 3./4. Environment variables
        current = Self::apply_env_overrides(current, None)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply `STACKCTL_*` and `CLUSTER_*` environment variables as explicit overrides.
    ///
    /// `source` replaces the process environment (used by tests).
    pub fn apply_env_overrides(
        mut settings: Self,
        source: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let prefixed = Config::builder()
            .add_source(
                Environment::with_prefix("STACKCTL")
                    .prefix_separator("_")
                    .separator("__")
                    .source(source.clone()),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = prefixed.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = prefixed.get_string("backup_dir") {
            settings.backup_dir = PathBuf::from(val);
        }
        if let Ok(val) = prefixed.get_string("cluster_name") {
            settings.cluster_name = Some(val);
        }
        if let Ok(val) = prefixed.get_string("backup_key") {
            settings.backup_key = Some(val);
        }
        if let Ok(val) = prefixed.get_string("backup_exclude") {
            settings.backup_exclude = split_list(&val);
        }
        if let Ok(val) = prefixed.get_string("global_env_file") {
            settings.global_env_file = val;
        }
        if let Ok(val) = prefixed.get_string("descriptor_files") {
            settings.descriptor_files = split_list(&val);
        }
        if let Ok(val) = prefixed.get_string("hook_file") {
            settings.hook_file = val;
        }
        if let Ok(val) = prefixed.get_string("source_dir") {
            settings.source_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = prefixed.get_string("tools.docker") {
            settings.tools.docker = val;
        }
        if let Ok(val) = prefixed.get_string("tools.ssh") {
            settings.tools.ssh = val;
        }
        if let Ok(val) = prefixed.get_string("tools.git") {
            settings.tools.git = val;
        }
        if let Ok(val) = prefixed.get_string("tools.tar") {
            settings.tools.tar = val;
        }
        if let Ok(val) = prefixed.get_string("tools.gpg") {
            settings.tools.gpg = val;
        }

        // CLUSTER_DATA, CLUSTER_BACKUP, CLUSTER_NAME, CLUSTER_BACKUP_KEY
        let cluster = Config::builder()
            .add_source(Environment::with_prefix("CLUSTER").source(source))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = cluster.get_string("data") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = cluster.get_string("backup") {
            settings.backup_dir = PathBuf::from(val);
        }
        if let Ok(val) = cluster.get_string("name") {
            settings.cluster_name = Some(val);
        }
        if let Ok(val) = cluster.get_string("backup_key") {
            settings.backup_key = Some(val).filter(|k| !k.is_empty());
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn given_defaults_when_created_then_excludes_storage() {
        let settings = Settings::default();
        assert_eq!(settings.backup_exclude, vec!["storage".to_string()]);
        assert_eq!(settings.global_env_path(), PathBuf::from("/srv/cluster/env"));
        assert_eq!(settings.tools.docker, "docker");
    }

    #[test]
    fn given_cluster_env_vars_when_apply_overrides_then_replaces_values() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env(&[
                ("CLUSTER_DATA", "/data"),
                ("CLUSTER_BACKUP", "/bk"),
                ("CLUSTER_NAME", "beta"),
                ("CLUSTER_BACKUP_KEY", "ops@example.org"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("/data"));
        assert_eq!(settings.backup_dir, PathBuf::from("/bk"));
        assert_eq!(settings.cluster_name.as_deref(), Some("beta"));
        assert_eq!(settings.backup_key.as_deref(), Some("ops@example.org"));
    }

    #[test]
    fn given_prefixed_env_vars_when_apply_overrides_then_sets_tools_and_lists() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env(&[
                ("STACKCTL_TOOLS__DOCKER", "/usr/local/bin/docker"),
                ("STACKCTL_BACKUP_EXCLUDE", "storage, cache"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.tools.docker, "/usr/local/bin/docker");
        assert_eq!(
            settings.backup_exclude,
            vec!["storage".to_string(), "cache".to_string()]
        );
    }

    #[test]
    fn given_both_prefixes_when_apply_overrides_then_cluster_names_win() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env(&[("STACKCTL_DATA_DIR", "/a"), ("CLUSTER_DATA", "/b")]),
        )
        .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/b"));
    }

    #[test]
    fn given_empty_backup_key_when_apply_overrides_then_unset() {
        let settings =
            Settings::apply_env_overrides(Settings::default(), env(&[("CLUSTER_BACKUP_KEY", "")]))
                .unwrap();
        assert_eq!(settings.backup_key, None);
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/cluster"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.data_dir.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_raw_overlay_when_merge_then_only_specified_fields_change() {
        let overlay = RawSettings {
            cluster_name: Some("gamma".into()),
            tools: RawToolsConfig {
                ssh: Some("autossh".into()),
                ..RawToolsConfig::default()
            },
            ..RawSettings::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.cluster_name.as_deref(), Some("gamma"));
        assert_eq!(merged.tools.ssh, "autossh");
        assert_eq!(merged.tools.docker, "docker");
        assert_eq!(merged.data_dir, PathBuf::from("/srv/cluster"));
    }
}
