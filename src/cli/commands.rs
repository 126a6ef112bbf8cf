// file: src/cli/commands.rs
// version: 1.0.0
// guid: 0f3c81e7-d92a-4b56-8e07-6c4a1d25b9e8

//! Command implementations for the CLI

use crate::{
    cluster::{self, ClusterContext, ANSIBLE, ANSIBLE_PLAYBOOK, TERRAFORM},
    config::ConfigLoader,
    executor::{CommandRunner, SystemRunner},
    logging::with_operation_span,
};
use anyhow::{bail, Context, Result};
use std::future::Future;
use std::path::Path;
use tracing::{error, info, warn};

/// How a command raced against an interrupt ended
#[derive(Debug, PartialEq, Eq)]
pub enum Completion<T> {
    Finished(T),
    Interrupted,
}

/// Run `command` unless `interrupt` fires first
///
/// When the interrupt listener itself fails the command runs to completion.
pub async fn run_interruptible<F, S>(command: F, interrupt: S) -> Completion<F::Output>
where
    F: Future,
    S: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(command);
    tokio::select! {
        output = &mut command => Completion::Finished(output),
        signal = interrupt => match signal {
            Ok(()) => Completion::Interrupted,
            Err(e) => {
                warn!("Could not listen for Ctrl+C: {}", e);
                Completion::Finished(command.await)
            }
        },
    }
}

fn load_context(config_path: &Path) -> Result<ClusterContext> {
    let config = ConfigLoader::new()
        .load_cluster_config(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    info!(
        "Loaded configuration for cluster '{}' from {}",
        config.cluster.name,
        config_path.display()
    );
    Ok(ClusterContext::new(config)?)
}

/// Provision the cluster infrastructure
pub async fn create_command(config_path: &Path) -> Result<()> {
    let ctx = load_context(config_path)?;
    with_operation_span("create", || cluster::create_cluster(&ctx))
        .await
        .context("Cluster creation failed")
}

/// Install Kubernetes on provisioned infrastructure
pub async fn install_command(config_path: &Path) -> Result<()> {
    let ctx = load_context(config_path)?;
    with_operation_span("install", || cluster::install_cluster(&ctx))
        .await
        .context("Kubernetes installation failed")
}

/// Tear the cluster infrastructure down
pub async fn destroy_command(config_path: &Path) -> Result<()> {
    let ctx = load_context(config_path)?;
    with_operation_span("destroy", || cluster::destroy_cluster(&ctx))
        .await
        .context("Cluster teardown failed")
}

/// Check that every external tool is on PATH
pub async fn check_prerequisites_command() -> Result<()> {
    info!("Checking system prerequisites for cluster operations");

    let runner = SystemRunner::new();
    let mut missing = Vec::new();
    for tool in [TERRAFORM, ANSIBLE, ANSIBLE_PLAYBOOK] {
        match runner.locate(tool).await {
            Ok(path) => info!("✓ {} found at {}", tool, path.display()),
            Err(_) => {
                error!("✗ {} not found", tool);
                missing.push(tool);
            }
        }
    }

    if !missing.is_empty() {
        bail!("Missing required commands: {}", missing.join(", "));
    }

    info!("✓ All required commands are available");
    Ok(())
}
