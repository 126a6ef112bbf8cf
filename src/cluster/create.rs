// file: src/cluster/create.rs
// version: 1.0.0
// guid: 85c2e1f9-34a7-4b0d-9f62-0e7d4b18a5c3

//! Infrastructure provisioning

use super::{verify_tool, ClusterContext, TERRAFORM};
use crate::executor::Invocation;
use crate::template::TemplateId;
use crate::Result;
use tracing::info;

/// Render the terraform inputs and apply them
pub async fn create_cluster(ctx: &ClusterContext) -> Result<()> {
    verify_tool(ctx.runner.as_ref(), TERRAFORM, &["version"]).await?;

    let mut profiles = ctx.profiles();
    ctx.selector().select(&mut profiles).await?;

    let terraform_dir = ctx.layout.terraform_dir();

    let init = Invocation::new(TERRAFORM, ["init"], &terraform_dir);
    ctx.runner.run(&init).await?.check(&init)?;

    let var_file = format!("-var-file={}", TemplateId::Credentials.file_name());
    let apply = Invocation::new(
        TERRAFORM,
        ["apply", var_file.as_str(), "-auto-approve"],
        &terraform_dir,
    );
    ctx.runner.run(&apply).await?.check(&apply)?;

    info!(
        "Infrastructure for cluster '{}' created",
        ctx.config.cluster.name
    );
    Ok(())
}
