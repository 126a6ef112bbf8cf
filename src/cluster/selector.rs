// file: src/cluster/selector.rs
// version: 1.0.0
// guid: 0d6c3b92-e75a-4f18-b2c4-98a1e5f07d3c

//! Distribution selection and terraform input rendering

use super::layout::WorkspaceLayout;
use crate::config::{
    ClusterConfig, DistributionProfile, DistributionSettings, ProfileTable, CUSTOM_LABEL,
};
use crate::template::{render_all, ArtifactRenderer, RenderedArtifact, TemplateId};
use crate::{ClusterError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of distribution selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub ssh_user: String,
    pub os_label: String,
    pub profile: DistributionProfile,
}

/// Validate the distribution settings and pick the active profile
///
/// A custom AMI registers a `custom` entry into `table`.
pub fn resolve_distribution(
    settings: &DistributionSettings,
    table: &mut ProfileTable,
) -> Result<Selection> {
    let ami_id = settings.ami_id();
    let ssh_user = settings.ssh_user();

    if ami_id.is_some() && ssh_user.is_none() {
        return Err(ClusterError::validation(
            "SSH username is required when using a custom AMI",
        ));
    }
    if ami_id.is_none() && settings.os().is_none() {
        return Err(ClusterError::validation(
            "Provide either an AMI id or an OS in the config file",
        ));
    }

    let os_label = match (ami_id, ssh_user) {
        (Some(ami_id), Some(ssh_user)) => {
            table.register_custom(ssh_user, ami_id);
            CUSTOM_LABEL.to_string()
        }
        _ => settings.os().unwrap_or_default().to_string(),
    };

    let profile = table.get(&os_label).cloned().ok_or_else(|| {
        ClusterError::config(format!(
            "Unknown OS '{}', expected one of: {}",
            os_label,
            table.labels().join(", ")
        ))
    })?;

    Ok(Selection {
        ssh_user: profile.user.clone(),
        os_label,
        profile,
    })
}

/// Selects the distribution and renders every terraform input for it
pub struct DistributionSelector<'a> {
    config: &'a ClusterConfig,
    layout: &'a WorkspaceLayout,
    renderer: Arc<dyn ArtifactRenderer>,
}

impl<'a> DistributionSelector<'a> {
    pub fn new(
        config: &'a ClusterConfig,
        layout: &'a WorkspaceLayout,
        renderer: Arc<dyn ArtifactRenderer>,
    ) -> Self {
        Self {
            config,
            layout,
            renderer,
        }
    }

    /// Resolve the distribution and render all inputs
    ///
    /// Returns only after every file has been written.
    pub async fn select(&self, table: &mut ProfileTable) -> Result<Selection> {
        let selection = resolve_distribution(&self.config.distribution, table)?;
        info!(
            "Using distribution '{}' with SSH user '{}'",
            selection.os_label, selection.ssh_user
        );

        render_all(Arc::clone(&self.renderer), self.artifacts(&selection)).await?;
        debug!(
            "Terraform inputs rendered in {}",
            self.layout.terraform_dir().display()
        );

        Ok(selection)
    }

    /// Files rendered for a selection
    pub fn artifacts(&self, selection: &Selection) -> Vec<RenderedArtifact> {
        let infrastructure = if selection.os_label == CUSTOM_LABEL {
            TemplateId::CustomInfrastructure
        } else {
            TemplateId::Infrastructure
        };

        vec![
            RenderedArtifact::new(
                infrastructure,
                self.layout.artifact_path(infrastructure),
                &selection.profile,
            ),
            credentials_artifact(self.config, self.layout),
            RenderedArtifact::new(
                TemplateId::Variables,
                self.layout.artifact_path(TemplateId::Variables),
                &selection.profile,
            ),
            RenderedArtifact::new(
                TemplateId::TerraformVars,
                self.layout.artifact_path(TemplateId::TerraformVars),
                &self.config.cluster,
            ),
        ]
    }
}

/// The credentials variable file
pub fn credentials_artifact(config: &ClusterConfig, layout: &WorkspaceLayout) -> RenderedArtifact {
    RenderedArtifact::new(TemplateId::Credentials, layout.credentials_file(), &config.aws)
}
