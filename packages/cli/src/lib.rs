//! Headless host for the layoutpad editor.
//!
//! The `layoutpad` binary is a thin clap front end over these modules so the
//! subcommands can be exercised from integration tests.

pub mod commands;
pub mod config;
pub mod script;
