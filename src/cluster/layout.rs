// file: src/cluster/layout.rs
// version: 1.0.0
// guid: e4a09c6b-1d72-4f85-a3b0-7c5e28d91f46

//! Paths inside the kubespray checkout

use crate::config::WorkspaceConfig;
use crate::template::TemplateId;
use std::path::{Path, PathBuf};

/// Kubespray version that switched group variables to per-group directories
pub const NESTED_LAYOUT_VERSION: &str = "develop";

/// How group variables are laid out inside an inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryLayout {
    /// `group_vars/k8s-cluster/k8s-cluster.yml` and `group_vars/all/all.yml`
    Nested,
    /// `group_vars/k8s-cluster.yml` and `group_vars/all.yml`
    Flat,
}

impl InventoryLayout {
    pub fn for_kubespray_version(version: &str) -> Self {
        if version.trim() == NESTED_LAYOUT_VERSION {
            InventoryLayout::Nested
        } else {
            InventoryLayout::Flat
        }
    }

    /// Cluster wide settings file (`k8s-cluster.yml`)
    pub fn cluster_settings_file(&self, inventory: &Path) -> PathBuf {
        let group_vars = inventory.join("group_vars");
        match self {
            InventoryLayout::Nested => group_vars.join("k8s-cluster").join("k8s-cluster.yml"),
            InventoryLayout::Flat => group_vars.join("k8s-cluster.yml"),
        }
    }

    /// Variables applied to every host (`all.yml`)
    pub fn group_vars_file(&self, inventory: &Path) -> PathBuf {
        let group_vars = inventory.join("group_vars");
        match self {
            InventoryLayout::Nested => group_vars.join("all").join("all.yml"),
            InventoryLayout::Flat => group_vars.join("all.yml"),
        }
    }
}

/// Resolved locations of every file the sequencers read or write
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
    inventory_name: String,
    inventory_layout: InventoryLayout,
}

impl WorkspaceLayout {
    pub fn new(workspace: &WorkspaceConfig, kubespray_version: &str) -> Self {
        Self {
            root: workspace.root.clone(),
            inventory_name: workspace.inventory_name.clone(),
            inventory_layout: InventoryLayout::for_kubespray_version(kubespray_version),
        }
    }

    /// Kubespray checkout; working directory of the playbook run
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn inventory_layout(&self) -> InventoryLayout {
        self.inventory_layout
    }

    /// Working directory of every terraform run
    pub fn terraform_dir(&self) -> PathBuf {
        self.root.join("contrib").join("terraform").join("aws")
    }

    pub fn artifact_path(&self, template: TemplateId) -> PathBuf {
        self.terraform_dir().join(template.file_name())
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.artifact_path(TemplateId::Credentials)
    }

    /// Inventory written by terraform
    pub fn hosts_file(&self) -> PathBuf {
        self.root.join("inventory").join("hosts")
    }

    pub fn sample_inventory(&self) -> PathBuf {
        self.root.join("inventory").join("sample")
    }

    pub fn cluster_inventory(&self) -> PathBuf {
        self.root.join("inventory").join(&self.inventory_name)
    }

    pub fn bastion_config(&self) -> PathBuf {
        self.root.join("ssh-bastion.conf")
    }

    /// Inventory argument for ansible-playbook, relative to the root
    pub fn playbook_inventory(&self) -> String {
        format!("./inventory/{}/hosts", self.inventory_name)
    }
}
