//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod envfile;
pub mod error;
pub mod table;

pub use entities::*;
pub use envfile::{
    concat_sources, env_sources, expand_env_vars, parse_env_vars, EnvLayer, EnvSource,
    ASSEMBLED_ENV_FILE, STACK_ENV_FILE,
};
pub use error::DomainError;
pub use table::{sort_table, SortColumn};
