// file: src/config/distribution.rs
// version: 1.0.0
// guid: 71b9e2d4-c035-4a8f-9e16-d4a08f3c5b27

//! Distribution profiles mapping an OS label to AMI lookup parameters

use serde::Serialize;
use std::collections::HashMap;

/// Label under which a user supplied AMI is registered
pub const CUSTOM_LABEL: &str = "custom";

/// AMI lookup parameters for one operating system
///
/// Field names match the variables used inside the terraform templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionProfile {
    /// SSH login user baked into the image
    #[serde(rename = "User")]
    pub user: String,
    /// AMI owner account, or the AMI id itself for custom images
    #[serde(rename = "AmiOwner")]
    pub ami_owner: String,
    /// AMI name filter
    #[serde(rename = "OS")]
    pub os: String,
}

impl DistributionProfile {
    pub fn new(
        user: impl Into<String>,
        ami_owner: impl Into<String>,
        os: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            ami_owner: ami_owner.into(),
            os: os.into(),
        }
    }
}

/// Per-run table of distribution profiles keyed by OS label
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: HashMap<String, DistributionProfile>,
}

impl ProfileTable {
    /// Table with the built-in distributions
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "centos".to_string(),
            DistributionProfile::new("centos", "688023202711", "dcos-centos7-*"),
        );
        profiles.insert(
            "ubuntu".to_string(),
            DistributionProfile::new(
                "ubuntu",
                "099720109477",
                "ubuntu/images/hvm-ssd/ubuntu-xenial-16.04-amd64-server-*",
            ),
        );
        profiles.insert(
            "coreos".to_string(),
            DistributionProfile::new("core", "595879546273", "CoreOS-stable-*"),
        );
        Self { profiles }
    }

    pub fn get(&self, label: &str) -> Option<&DistributionProfile> {
        self.profiles.get(label)
    }

    /// Register (or replace) the `custom` entry for a user supplied AMI
    pub fn register_custom(&mut self, ssh_user: &str, ami_id: &str) -> &DistributionProfile {
        self.profiles.insert(
            CUSTOM_LABEL.to_string(),
            DistributionProfile::new(ssh_user, ami_id, CUSTOM_LABEL),
        );
        &self.profiles[CUSTOM_LABEL]
    }

    /// Known labels, sorted
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
