// file: src/cluster/inventory.rs
// version: 1.0.0
// guid: b85e16c3-7d40-42af-9c8e-3f06a2d4e7b1

//! Kubespray inventory preparation

use super::endpoint::ResolvedEndpoint;
use crate::{ClusterError, Result};
use fs_extra::dir::CopyOptions;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// API port exposed by the load balancer
pub const API_SERVER_PORT: u16 = 6443;

/// Flip `kubeadm_enabled` on in a group variables file
///
/// A missing file is reported and skipped.
pub fn enable_kubeadm(group_vars: &Path) -> Result<()> {
    if !group_vars.exists() {
        warn!("{} not found, cannot enable kubeadm", group_vars.display());
        return Ok(());
    }

    let content = fs::read_to_string(group_vars)?;
    let updated = replace_setting(&content, "kubeadm_enabled", "true")?;
    if updated != content {
        fs::write(group_vars, updated)?;
        info!("Enabled kubeadm in {}", group_vars.display());
    }
    Ok(())
}

/// Set `kube_network_plugin` in the cluster settings file
pub fn set_network_plugin(cluster_settings: &Path, plugin: &str) -> Result<()> {
    let content = fs::read_to_string(cluster_settings).map_err(|e| {
        ClusterError::file_not_found(format!("{}: {}", cluster_settings.display(), e))
    })?;
    let updated = replace_setting(&content, "kube_network_plugin", plugin)?;
    fs::write(cluster_settings, updated)?;
    debug!("Network plugin set to {}", plugin);
    Ok(())
}

/// Replace a top level `key: value` line, appending it when absent
fn replace_setting(content: &str, key: &str, value: &str) -> Result<String> {
    let pattern = format!(r"(?m)^{}:.*$", regex::escape(key));
    let re = Regex::new(&pattern)
        .map_err(|e| ClusterError::config(format!("Invalid regex pattern: {}", e)))?;
    let line = format!("{}: {}", key, value);

    if re.is_match(content) {
        return Ok(re.replace_all(content, line.as_str()).into_owned());
    }

    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&line);
    updated.push('\n');
    Ok(updated)
}

/// Create the cluster inventory from the sample and the generated hosts file
pub fn copy_sample_inventory(sample: &Path, hosts: &Path, target: &Path) -> Result<()> {
    let mut options = CopyOptions::new();
    options.copy_inside = true;
    options.overwrite = true;

    fs_extra::dir::copy(sample, target, &options).map_err(|e| {
        ClusterError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!(
                "Failed to copy {} to {}: {}",
                sample.display(),
                target.display(),
                e
            ),
        ))
    })?;
    fs::copy(hosts, target.join("hosts"))?;

    info!("Created cluster inventory at {}", target.display());
    Ok(())
}

/// Open an existing file for appending, never truncating it
pub fn open_for_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| {
            ClusterError::file_not_found(format!(
                "Error while trying to open {}: {}",
                path.display(),
                e
            ))
        })
}

/// Make kubespray copy the admin kubeconfig back to the operator
pub fn enable_kubeconfig_localhost(cluster_settings: &Path) -> Result<()> {
    let mut file = open_for_append(cluster_settings)?;
    writeln!(file, "kubeconfig_localhost: true")?;
    Ok(())
}

/// Append the AWS cloud provider and load balancer settings
pub fn write_load_balancer_settings<W: Write>(
    writer: &mut W,
    endpoint: &ResolvedEndpoint,
) -> Result<()> {
    writeln!(writer, "#Set cloud provider to AWS")?;
    writeln!(writer, "cloud_provider: 'aws'")?;
    writeln!(writer, "#Load Balancer Configuration")?;
    writeln!(writer, "loadbalancer_apiserver_localhost: false")?;
    writeln!(
        writer,
        "apiserver_loadbalancer_domain_name: \"{}\"",
        endpoint.domain_name
    )?;
    writeln!(writer, "loadbalancer_apiserver:")?;
    writeln!(writer, "  address: {}", endpoint.address)?;
    writeln!(writer, "  port: {}", API_SERVER_PORT)?;
    Ok(())
}
