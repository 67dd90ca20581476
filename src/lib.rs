//! stackctl: deploy and operate docker stacks from a cluster-data directory
//!
//! A stack is a directory below the cluster-data root holding an orchestration
//! descriptor. Before deploying, the layered env files (global, stack,
//! architecture, mode) are assembled into the stack's `.env`; then the work is
//! handed to `docker stack` in swarm mode or `docker compose` otherwise.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
