//! pkgsign CLI library — key authoring and verification commands.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

/// CLI subcommand implementations.
pub mod commands;
/// CLI configuration — read/write `~/.pkgsign/config.toml`.
pub mod config;
