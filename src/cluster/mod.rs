// file: src/cluster/mod.rs
// version: 1.0.0
// guid: d39b5a07-2e6f-4c81-a4d9-51c8f7e03b2a

//! Cluster lifecycle sequencers
//!
//! `create` provisions infrastructure with terraform, `install` configures
//! the hosts with kubespray and `destroy` tears the infrastructure down. Each
//! sequencer returns on the first unrecoverable error; terminating the
//! process is left to the caller.

pub mod create;
pub mod destroy;
pub mod endpoint;
pub mod install;
pub mod inventory;
pub mod layout;
pub mod selector;

#[cfg(test)]
pub(crate) mod testkit;

pub use create::create_cluster;
pub use destroy::destroy_cluster;
pub use endpoint::{DnsResolver, EndpointResolver, ResolvedEndpoint};
pub use install::install_cluster;
pub use layout::{InventoryLayout, WorkspaceLayout};
pub use selector::{DistributionSelector, Selection};

use crate::config::{ClusterConfig, ProfileTable};
use crate::executor::{CommandRunner, SystemRunner};
use crate::template::{ArtifactRenderer, TemplateRenderer};
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Infrastructure provisioning tool
pub const TERRAFORM: &str = "terraform";
/// Configuration management tool checked before a playbook run
pub const ANSIBLE: &str = "ansible";
/// Playbook runner
pub const ANSIBLE_PLAYBOOK: &str = "ansible-playbook";

/// Everything a sequencer needs for one run
pub struct ClusterContext {
    pub config: ClusterConfig,
    pub layout: WorkspaceLayout,
    pub runner: Arc<dyn CommandRunner>,
    pub renderer: Arc<dyn ArtifactRenderer>,
    pub resolver: Arc<dyn EndpointResolver>,
}

impl ClusterContext {
    /// Context using real processes, the embedded templates and system DNS
    pub fn new(config: ClusterConfig) -> Result<Self> {
        Ok(Self::with_parts(
            config,
            Arc::new(SystemRunner::new()),
            Arc::new(TemplateRenderer::new()?),
            Arc::new(DnsResolver),
        ))
    }

    pub fn with_parts(
        config: ClusterConfig,
        runner: Arc<dyn CommandRunner>,
        renderer: Arc<dyn ArtifactRenderer>,
        resolver: Arc<dyn EndpointResolver>,
    ) -> Self {
        let layout = WorkspaceLayout::new(&config.workspace, &config.kubespray.version);
        Self {
            config,
            layout,
            runner,
            renderer,
            resolver,
        }
    }

    pub fn selector(&self) -> DistributionSelector<'_> {
        DistributionSelector::new(&self.config, &self.layout, Arc::clone(&self.renderer))
    }

    /// Fresh profile table for this run
    pub fn profiles(&self) -> ProfileTable {
        ProfileTable::builtin()
    }
}

/// Locate a required tool and print its version banner
pub async fn verify_tool(
    runner: &dyn CommandRunner,
    tool: &str,
    version_args: &[&str],
) -> Result<PathBuf> {
    let path = runner.locate(tool).await?;
    info!("Found {} at {}", tool, path.display());

    let banner = runner.version(tool, version_args).await?;
    for line in banner.lines() {
        info!("{}", line);
    }

    Ok(path)
}
