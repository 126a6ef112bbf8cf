// file: src/config/loader.rs
// version: 1.0.0
// guid: a0d73e5c-4b18-49f2-8c6e-17f9b2e04d86

//! Configuration file loading and environment variable substitution

use super::ClusterConfig;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader seeded from the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load cluster configuration from a YAML file
    pub fn load_cluster_config<P: AsRef<Path>>(&self, path: P) -> Result<ClusterConfig> {
        let content = fs::read_to_string(&path).map_err(|e| {
            crate::ClusterError::config(format!(
                "Failed to read cluster config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_cluster_config(&content)
    }

    /// Parse cluster configuration from YAML text
    pub fn parse_cluster_config(&self, content: &str) -> Result<ClusterConfig> {
        let expanded = self.expand_env_vars(content)?;
        let config: ClusterConfig = serde_yaml::from_str(&expanded)?;

        config.validate()?;

        Ok(config)
    }

    /// Expand `${VAR}` placeholders in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            crate::ClusterError::config(format!("Invalid regex pattern: {}", e))
        })?;

        let mut missing_vars = Vec::new();
        let expanded = re.replace_all(content, |cap: &regex::Captures| {
            let var_name = &cap[1];
            match self.env_vars.get(var_name) {
                Some(value) => value.clone(),
                None => {
                    missing_vars.push(var_name.to_string());
                    String::new()
                }
            }
        });

        if !missing_vars.is_empty() {
            missing_vars.dedup();
            return Err(crate::ClusterError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(expanded.into_owned())
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_var_expansion() {
        let mut loader = ConfigLoader::new();
        loader.set_env_var("TEST_VAR".to_string(), "test_value".to_string());

        let content = "key: ${TEST_VAR}";
        let result = loader.expand_env_vars(content).unwrap();
        assert_eq!(result, "key: test_value");
    }

    #[test]
    fn test_missing_env_var() {
        let loader = ConfigLoader::new();
        let content = "key: ${CLUSTER_AGENT_MISSING_VAR}";

        let result = loader.expand_env_vars(content);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing environment variables"));
    }

    #[test]
    fn test_load_cluster_config() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
aws:
  access_key_id: ${{TEST_AWS_KEY}}
  secret_access_key: secret
  ssh_keypair: ops
  default_region: us-east-1
cluster:
  name: prod
  kube_worker_num: 3
distribution:
  os: ubuntu
kubespray:
  version: develop
  network_plugin: flannel
  kubeadm_enabled: true
"#
        )
        .unwrap();

        let mut loader = ConfigLoader::new();
        loader.set_env_var("TEST_AWS_KEY".to_string(), "AKIAEXAMPLE".to_string());
        let config = loader.load_cluster_config(file.path())?;

        assert_eq!(config.aws.access_key_id, "AKIAEXAMPLE");
        assert_eq!(config.cluster.kube_worker_num, 3);
        assert_eq!(config.distribution.os(), Some("ubuntu"));
        assert_eq!(config.kubespray.network_plugin, "flannel");
        assert!(config.kubespray.kubeadm_enabled);

        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new();
        let err = loader
            .load_cluster_config("/nonexistent/cluster.yaml")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read cluster config file"));
    }
}
