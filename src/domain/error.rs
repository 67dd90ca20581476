//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("missing stack argument")]
    EmptyStackToken,

    #[error("stack '{0}' points outside the cluster-data root")]
    StackOutsideDataRoot(String),

    #[error("unknown list selector: {0} (expected services, tasks, stacks or nodes)")]
    UnknownListKind(String),

    #[error("invalid sort column '{column}': {reason}")]
    InvalidSortColumn { column: String, reason: String },
}
