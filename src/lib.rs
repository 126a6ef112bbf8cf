// file: src/lib.rs
// version: 1.0.0
// guid: 7c05e3a1-f84b-4d29-9a6e-e1b3d70f5c42

//! # AWS Cluster Agent
//!
//! Drives the lifecycle of a Kubernetes cluster on AWS. Terraform inputs are
//! rendered from embedded templates, terraform provisions the machines and
//! kubespray (ansible) installs Kubernetes on them.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod template;

pub use error::{ClusterError, Result};

/// Version information for the agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
