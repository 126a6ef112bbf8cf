// file: src/logging/mod.rs
// version: 1.0.0
// guid: 8d0e4b71-2c95-4f3a-b6e8-5a17c90d3e42

//! Logging system for the cluster lifecycle agent

pub mod logger;

pub use logger::{init_logger, with_operation_span};
