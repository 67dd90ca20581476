//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{BackupService, ClusterService, StackService, UpgradeService};
use crate::application::ClusterContext;
use crate::config::Settings;
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};

/// Container holding settings, the detected cluster context and the I/O
/// boundaries; services are built on demand from these.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Cluster facts, detected once
    pub context: Arc<ClusterContext>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
        )
    }

    /// Create a service container with custom dependencies, probing the
    /// cluster context through `cmd`.
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        let context = ClusterContext::detect(&settings, cmd.as_ref());
        Self::with_context(settings, context, fs, cmd)
    }

    /// Create a service container around an already known context (for testing).
    pub fn with_context(
        settings: Settings,
        context: ClusterContext,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            context: Arc::new(context),
            fs,
            cmd,
        }
    }

    pub fn stack_service(&self) -> StackService {
        StackService::new(
            self.fs.clone(),
            self.cmd.clone(),
            self.settings.clone(),
            self.context.clone(),
        )
    }

    pub fn cluster_service(&self) -> ClusterService {
        ClusterService::new(self.cmd.clone(), self.settings.clone(), self.context.clone())
    }

    pub fn backup_service(&self) -> BackupService {
        BackupService::new(
            self.fs.clone(),
            self.cmd.clone(),
            self.settings.clone(),
            self.context.clone(),
        )
    }

    pub fn upgrade_service(&self) -> UpgradeService {
        UpgradeService::new(self.fs.clone(), self.cmd.clone(), self.settings.clone())
    }
}
