//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

mod backup;
mod cluster;
mod environment;
mod hook;
mod resolver;
mod stack;
mod upgrade;

pub use backup::{BackupOutcome, BackupService, TIMESTAMP_FORMAT};
pub use cluster::{ClusterService, StatsTarget};
pub use environment::{AssembledEnv, EnvAssembler};
pub use hook::HookRunner;
pub use resolver::StackResolver;
pub use stack::{Deployment, Lifecycle, StackService};
pub use upgrade::UpgradeService;
