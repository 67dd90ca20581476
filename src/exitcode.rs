//! Exit codes
//!
//! Usage errors exit with 1; the remaining codes follow BSD sysexits.h.
//! A failed delegated command exits with that command's own code.

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error, help shown, or swarm-only operation without swarm
pub const USAGE: i32 = 1;

/// Stack directory or descriptor not found
pub const NOINPUT: i32 = 66;

/// Delegated command ended without an exit code (killed by a signal)
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
