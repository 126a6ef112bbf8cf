// file: src/cli/args.rs
// version: 1.0.0
// guid: a62f9c0e-7b3d-48e1-b5a4-2d09e6f17c83

//! Command line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aws-cluster-agent")]
#[command(about = "Provision, install and destroy Kubernetes clusters on AWS")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Cluster configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "CLUSTER_CONFIG",
        default_value = "config.yaml"
    )]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Create the AWS infrastructure with terraform
    Create,

    /// Install Kubernetes on the infrastructure with kubespray
    Install,

    /// Destroy the AWS infrastructure
    Destroy,

    /// Check that terraform and ansible are available
    CheckPrereqs,
}
