// file: src/template/mod.rs
// version: 1.0.0
// guid: 2c8a5f37-d619-4e0b-93d4-6fa1b8e27c05

//! Terraform input rendering
//!
//! Templates are compiled into the binary and rendered with minijinja. Each
//! rendered artifact fully overwrites its target file.

use crate::{ClusterError, Result};
use async_trait::async_trait;
use minijinja::{Environment, UndefinedBehavior, Value};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

const INFRASTRUCTURE_TEMPLATE: &str =
    include_str!("../../templates/create-infrastructure.tf.j2");
const CUSTOM_INFRASTRUCTURE_TEMPLATE: &str =
    include_str!("../../templates/create-infrastructure-custom.tf.j2");
const CREDENTIALS_TEMPLATE: &str = include_str!("../../templates/credentials.tfvars.j2");
const VARIABLES_TEMPLATE: &str = include_str!("../../templates/variables.tf.j2");
const TERRAFORM_VARS_TEMPLATE: &str = include_str!("../../templates/terraform.tfvars.j2");

/// Templates known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Infrastructure,
    CustomInfrastructure,
    Credentials,
    Variables,
    TerraformVars,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::Infrastructure,
        TemplateId::CustomInfrastructure,
        TemplateId::Credentials,
        TemplateId::Variables,
        TemplateId::TerraformVars,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TemplateId::Infrastructure => "infrastructure",
            TemplateId::CustomInfrastructure => "custom-infrastructure",
            TemplateId::Credentials => "credentials",
            TemplateId::Variables => "variables",
            TemplateId::TerraformVars => "terraform-vars",
        }
    }

    /// File name the template renders to inside the terraform directory
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateId::Infrastructure | TemplateId::CustomInfrastructure => {
                "create-infrastructure.tf"
            }
            TemplateId::Credentials => "credentials.tfvars",
            TemplateId::Variables => "variables.tf",
            TemplateId::TerraformVars => "terraform.tfvars",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            TemplateId::Infrastructure => INFRASTRUCTURE_TEMPLATE,
            TemplateId::CustomInfrastructure => CUSTOM_INFRASTRUCTURE_TEMPLATE,
            TemplateId::Credentials => CREDENTIALS_TEMPLATE,
            TemplateId::Variables => VARIABLES_TEMPLATE,
            TemplateId::TerraformVars => TERRAFORM_VARS_TEMPLATE,
        }
    }
}

/// One file to produce: template, destination and data
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub template: TemplateId,
    pub output: PathBuf,
    pub data: Value,
}

impl RenderedArtifact {
    /// Build an artifact from any serializable data record
    pub fn new<T: Serialize>(template: TemplateId, output: impl Into<PathBuf>, data: &T) -> Self {
        Self {
            template,
            output: output.into(),
            data: Value::from_serialize(data),
        }
    }
}

/// Writes rendered artifacts to disk
#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    async fn render(&self, artifact: &RenderedArtifact) -> Result<()>;
}

/// minijinja backed renderer for the embedded templates
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        for id in TemplateId::ALL {
            env.add_template(id.name(), id.source())?;
        }
        Ok(Self { env })
    }

    /// Render a template to a string without touching the filesystem
    pub fn render_to_string(&self, template: TemplateId, data: &Value) -> Result<String> {
        let rendered = self.env.get_template(template.name())?.render(data)?;
        Ok(rendered)
    }
}

#[async_trait]
impl ArtifactRenderer for TemplateRenderer {
    async fn render(&self, artifact: &RenderedArtifact) -> Result<()> {
        let content = self.render_to_string(artifact.template, &artifact.data)?;
        if let Some(parent) = artifact.output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&artifact.output, content).await?;
        debug!(
            "Rendered {} to {}",
            artifact.template.name(),
            artifact.output.display()
        );
        Ok(())
    }
}

/// Render every artifact concurrently and wait for all of them
///
/// The first failure is returned after every task has finished.
pub async fn render_all(
    renderer: Arc<dyn ArtifactRenderer>,
    artifacts: Vec<RenderedArtifact>,
) -> Result<()> {
    let mut tasks = JoinSet::new();
    for artifact in artifacts {
        let renderer = Arc::clone(&renderer);
        tasks.spawn(async move {
            renderer
                .render(&artifact)
                .await
                .map_err(|e| describe_failure(&artifact.output, e))
        });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined
            .map_err(|e| ClusterError::template(format!("Render task failed: {}", e)))
            .and_then(|result| result);
        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn describe_failure(output: &Path, err: ClusterError) -> ClusterError {
    match err {
        ClusterError::Template(msg) => {
            ClusterError::template(format!("{}: {}", output.display(), msg))
        }
        other => other,
    }
}
