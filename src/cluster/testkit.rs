// file: src/cluster/testkit.rs
// version: 1.0.0
// guid: 6a1f8e4d-b270-4c93-8e5a-d3c7b09f2e61

//! Test doubles for the sequencers

use crate::config::{ClusterConfig, ConfigLoader};
use crate::executor::{CommandRunner, Invocation, RunOutcome};
use crate::template::{ArtifactRenderer, RenderedArtifact, TemplateId};
use crate::{ClusterError, Result};
use async_trait::async_trait;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::endpoint::EndpointResolver;

/// Config pointing the workspace at `root`
pub fn sample_config(root: impl AsRef<Path>) -> ClusterConfig {
    let yaml = format!(
        r#"
aws:
  access_key_id: AKIAEXAMPLE
  secret_access_key: secret
  ssh_keypair: ops
  default_region: eu-central-1
cluster:
  name: demo
distribution:
  os: centos
workspace:
  root: "{}"
"#,
        root.as_ref().display()
    );
    ConfigLoader::new()
        .parse_cluster_config(&yaml)
        .expect("sample config must parse")
}

/// Records invocations instead of starting processes
#[derive(Default)]
pub struct FakeRunner {
    missing: Vec<String>,
    exit_code: i32,
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn with_missing_tool(tool: &str) -> Self {
        Self {
            missing: vec![tool.to_string()],
            ..Self::default()
        }
    }

    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn locate(&self, tool: &str) -> Result<PathBuf> {
        if self.missing.iter().any(|m| m == tool) {
            return Err(ClusterError::tool_not_found(tool));
        }
        Ok(PathBuf::from("/usr/bin").join(tool))
    }

    async fn version(&self, tool: &str, _args: &[&str]) -> Result<String> {
        Ok(format!("{} v0.0.0-test\n", tool))
    }

    async fn run(&self, invocation: &Invocation) -> Result<RunOutcome> {
        self.invocations.lock().unwrap().push(invocation.clone());
        Ok(RunOutcome {
            exit_code: Some(self.exit_code),
            lines: vec![],
        })
    }
}

/// Records rendered templates and writes a placeholder for each
#[derive(Default)]
pub struct RecordingRenderer {
    rendered: Mutex<Vec<TemplateId>>,
}

impl RecordingRenderer {
    pub fn templates(&self) -> Vec<TemplateId> {
        self.rendered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactRenderer for RecordingRenderer {
    async fn render(&self, artifact: &RenderedArtifact) -> Result<()> {
        if let Some(parent) = artifact.output.parent() {
            if parent.exists() {
                tokio::fs::write(&artifact.output, artifact.template.name()).await?;
            }
        }
        self.rendered.lock().unwrap().push(artifact.template);
        Ok(())
    }
}

/// Resolver answering every lookup with the same addresses
pub struct StaticResolver {
    addresses: Vec<IpAddr>,
}

impl StaticResolver {
    pub fn new(addresses: &[&str]) -> Self {
        Self {
            addresses: addresses
                .iter()
                .map(|a| a.parse().expect("test address must parse"))
                .collect(),
        }
    }
}

#[async_trait]
impl EndpointResolver for StaticResolver {
    async fn lookup(&self, _name: &str) -> Result<Vec<IpAddr>> {
        Ok(self.addresses.clone())
    }
}
