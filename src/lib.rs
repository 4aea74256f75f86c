//! Early-boot file and link materialization.
//!
//! Reads a declarative TOML manifest of files and links and writes them under
//! a destination root.  Each file is fetched through a staging file in the
//! target's own directory, hashed while it streams, given its owner and mode,
//! and only then renamed over the target, so a target is either untouched or
//! complete.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate the manifest
//! - **[`resources`]**: resolve entries into plans and materialize them
//! - **[`fetch`]**: transports that stream a source into a verifying writer
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod operations;
pub mod resources;
