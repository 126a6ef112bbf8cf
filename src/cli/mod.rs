// file: src/cli/mod.rs
// version: 1.0.0
// guid: 4b7e2d95-0a18-4c63-9f4e-a85d1c3b60f7

//! Command line interface for the cluster lifecycle agent

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::*;
