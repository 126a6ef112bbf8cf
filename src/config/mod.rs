// file: src/config/mod.rs
// version: 1.0.0
// guid: 5e2b7c18-0f4a-4d93-a6c1-e83d90b27f54

//! Configuration module for the cluster lifecycle agent
//!
//! Handles loading and validation of the cluster configuration file and the
//! distribution profile table.

pub mod distribution;
pub mod loader;

pub use distribution::{DistributionProfile, ProfileTable, CUSTOM_LABEL};
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete cluster configuration as read from the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// AWS credentials and account level settings
    pub aws: AwsCredentials,
    /// Cluster sizing and networking
    pub cluster: ClusterSettings,
    /// Operating system selection
    #[serde(default)]
    pub distribution: DistributionSettings,
    /// Kubespray checkout settings
    #[serde(default)]
    pub kubespray: KubesprayConfig,
    /// Local working directory layout
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Values rendered into `credentials.tfvars`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub ssh_keypair: String,
    pub default_region: String,
}

/// Values rendered into `terraform.tfvars`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSettings {
    /// Cluster name, used as the terraform resource prefix
    pub name: String,
    #[serde(default = "default_vpc_cidr_block")]
    pub vpc_cidr_block: String,
    #[serde(default = "default_private_subnets")]
    pub cidr_subnets_private: Vec<String>,
    #[serde(default = "default_public_subnets")]
    pub cidr_subnets_public: Vec<String>,
    #[serde(default = "default_instance_size")]
    pub bastion_size: String,
    #[serde(default = "default_node_count")]
    pub kube_master_num: u32,
    #[serde(default = "default_instance_size")]
    pub kube_master_size: String,
    #[serde(default = "default_node_count")]
    pub etcd_num: u32,
    #[serde(default = "default_instance_size")]
    pub etcd_size: String,
    #[serde(default = "default_node_count")]
    pub kube_worker_num: u32,
    #[serde(default = "default_instance_size")]
    pub kube_worker_size: String,
    #[serde(default = "default_api_port")]
    pub elb_api_port: u16,
    #[serde(default = "default_api_port")]
    pub k8s_secure_api_port: u16,
    #[serde(default = "default_insecure_address")]
    pub kube_insecure_apiserver_address: String,
}

/// Operating system selection; empty strings count as unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionSettings {
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub ami_id: Option<String>,
    #[serde(default)]
    pub ssh_user: Option<String>,
}

impl DistributionSettings {
    pub fn os(&self) -> Option<&str> {
        non_empty(&self.os)
    }

    pub fn ami_id(&self) -> Option<&str> {
        non_empty(&self.ami_id)
    }

    pub fn ssh_user(&self) -> Option<&str> {
        non_empty(&self.ssh_user)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Kubespray checkout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubesprayConfig {
    /// Branch or tag of the kubespray checkout; `develop` uses the nested inventory layout
    #[serde(default = "default_kubespray_version")]
    pub version: String,
    #[serde(default = "default_network_plugin")]
    pub network_plugin: String,
    #[serde(default)]
    pub kubeadm_enabled: bool,
}

impl Default for KubesprayConfig {
    fn default() -> Self {
        Self {
            version: default_kubespray_version(),
            network_plugin: default_network_plugin(),
            kubeadm_enabled: false,
        }
    }
}

/// Where the kubespray checkout lives and how the cluster inventory is named
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
    #[serde(default = "default_inventory_name")]
    pub inventory_name: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            inventory_name: default_inventory_name(),
        }
    }
}

fn default_vpc_cidr_block() -> String {
    "10.250.192.0/18".to_string()
}

fn default_private_subnets() -> Vec<String> {
    vec!["10.250.192.0/20".to_string(), "10.250.208.0/20".to_string()]
}

fn default_public_subnets() -> Vec<String> {
    vec!["10.250.224.0/20".to_string(), "10.250.240.0/20".to_string()]
}

fn default_instance_size() -> String {
    "t2.medium".to_string()
}

fn default_node_count() -> u32 {
    1
}

fn default_api_port() -> u16 {
    6443
}

fn default_insecure_address() -> String {
    "0.0.0.0".to_string()
}

fn default_kubespray_version() -> String {
    "master".to_string()
}

fn default_network_plugin() -> String {
    "calico".to_string()
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("./kubespray")
}

fn default_inventory_name() -> String {
    "awscluster".to_string()
}

impl ClusterConfig {
    /// Validate the cluster configuration
    ///
    /// Distribution rules are checked by the selector, not here.
    pub fn validate(&self) -> crate::Result<()> {
        if self.cluster.name.trim().is_empty() {
            return Err(crate::ClusterError::validation(
                "Cluster name cannot be empty",
            ));
        }

        if self.workspace.inventory_name.trim().is_empty()
            || self.workspace.inventory_name.contains('/')
        {
            return Err(crate::ClusterError::validation(format!(
                "Invalid inventory name: '{}'",
                self.workspace.inventory_name
            )));
        }

        for (field, count) in [
            ("kube_master_num", self.cluster.kube_master_num),
            ("etcd_num", self.cluster.etcd_num),
            ("kube_worker_num", self.cluster.kube_worker_num),
        ] {
            if count == 0 {
                return Err(crate::ClusterError::validation(format!(
                    "{} must be at least 1",
                    field
                )));
            }
        }

        if self.kubespray.network_plugin.trim().is_empty() {
            return Err(crate::ClusterError::validation(
                "Network plugin cannot be empty",
            ));
        }

        Ok(())
    }
}
