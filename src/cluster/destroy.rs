// file: src/cluster/destroy.rs
// version: 1.0.0
// guid: 1e9a4d62-c8b7-4f05-a3e0-b6d25f81c49e

//! Infrastructure teardown

use super::selector::credentials_artifact;
use super::{verify_tool, ClusterContext, TERRAFORM};
use crate::executor::Invocation;
use crate::template::TemplateId;
use crate::Result;
use std::fs;
use tracing::{debug, info, warn};

/// Remove generated local state and destroy the terraform managed infrastructure
pub async fn destroy_cluster(ctx: &ClusterContext) -> Result<()> {
    verify_tool(ctx.runner.as_ref(), TERRAFORM, &["version"]).await?;

    let bastion = ctx.layout.bastion_config();
    if bastion.exists() {
        match fs::remove_file(&bastion) {
            Ok(()) => debug!("Removed {}", bastion.display()),
            Err(e) => warn!("Could not remove {}: {}", bastion.display(), e),
        }
    }

    let cluster_inventory = ctx.layout.cluster_inventory();
    if cluster_inventory.exists() {
        match fs::remove_dir_all(&cluster_inventory) {
            Ok(()) => info!("Removed cluster inventory {}", cluster_inventory.display()),
            Err(e) => warn!(
                "Could not remove cluster inventory {}: {}",
                cluster_inventory.display(),
                e
            ),
        }
    }

    let credentials = ctx.layout.credentials_file();
    if credentials.exists() {
        info!("Credentials file already exists, creation skipped");
    } else {
        let artifact = credentials_artifact(&ctx.config, &ctx.layout);
        ctx.renderer.render(&artifact).await?;
    }

    let var_file = format!("-var-file={}", TemplateId::Credentials.file_name());
    let destroy = Invocation::new(
        TERRAFORM,
        ["destroy", var_file.as_str(), "-force"],
        ctx.layout.terraform_dir(),
    );
    ctx.runner.run(&destroy).await?.check(&destroy)?;

    info!(
        "Infrastructure for cluster '{}' destroyed",
        ctx.config.cluster.name
    );
    Ok(())
}
