// file: src/cluster/install.rs
// version: 1.0.0
// guid: f2d70a4b-9c15-4e38-b6a1-4c8e3d92f057

//! Kubernetes installation on provisioned hosts
//!
//! The cluster inventory is only prepared when its directory does not exist
//! yet. Later runs reuse it as is, so group variables are never appended to
//! twice.

use super::endpoint::{extract_domain_name, resolve_endpoint};
use super::inventory;
use super::{verify_tool, ClusterContext, ANSIBLE, ANSIBLE_PLAYBOOK};
use crate::executor::Invocation;
use crate::{ClusterError, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Playbook run against the cluster inventory
pub const CLUSTER_PLAYBOOK: &str = "./cluster.yml";
/// Per-task SSH timeout handed to ansible
pub const PLAYBOOK_TIMEOUT_SECS: u32 = 60;

/// Prepare the inventory and run the kubespray cluster playbook
pub async fn install_cluster(ctx: &ClusterContext) -> Result<()> {
    verify_tool(ctx.runner.as_ref(), ANSIBLE, &["--version"]).await?;

    let hosts = ctx.layout.hosts_file();
    if !hosts.exists() {
        return Err(ClusterError::file_not_found(format!(
            "{} inventory file not found, run create first",
            hosts.display()
        )));
    }

    if ctx.config.kubespray.kubeadm_enabled {
        let sample_group_vars = ctx
            .layout
            .inventory_layout()
            .group_vars_file(&ctx.layout.sample_inventory());
        inventory::enable_kubeadm(&sample_group_vars)?;
    }

    let cluster_inventory = ctx.layout.cluster_inventory();
    if cluster_inventory.exists() {
        info!(
            "Configuration folder {} already exists",
            cluster_inventory.display()
        );
    } else {
        prepare_inventory(ctx).await?;
    }

    let mut profiles = ctx.profiles();
    let selection = ctx.selector().select(&mut profiles).await?;
    info!(
        "Starting playbook for user {} with os {}",
        selection.ssh_user, selection.os_label
    );

    let playbook = playbook_invocation(ctx, &selection.ssh_user, &selection.os_label);
    ctx.runner.run(&playbook).await?.check(&playbook)?;

    info!("Kubernetes installed on cluster '{}'", ctx.config.cluster.name);
    Ok(())
}

/// Copy the sample inventory and inject the load balancer settings
async fn prepare_inventory(ctx: &ClusterContext) -> Result<()> {
    let layout = &ctx.layout;
    let cluster_inventory = layout.cluster_inventory();

    inventory::copy_sample_inventory(
        &layout.sample_inventory(),
        &layout.hosts_file(),
        &cluster_inventory,
    )?;

    configure_inventory(ctx, &cluster_inventory)
        .await
        .map_err(|e| {
            warn!(
                "Cluster inventory {} is only partially prepared and will be reused as is; \
                 run destroy or delete it before installing again",
                cluster_inventory.display()
            );
            e
        })
}

async fn configure_inventory(ctx: &ClusterContext, cluster_inventory: &Path) -> Result<()> {
    let hosts = fs::read_to_string(ctx.layout.hosts_file())?;
    let domain_name = match extract_domain_name(&hosts) {
        Some(name) => name,
        None => {
            warn!("Problem getting the load balancer domain name, skipping API endpoint settings");
            return Ok(());
        }
    };
    info!("API load balancer: {}", domain_name);

    let inventory_layout = ctx.layout.inventory_layout();
    let cluster_settings = inventory_layout.cluster_settings_file(cluster_inventory);
    inventory::set_network_plugin(&cluster_settings, &ctx.config.kubespray.network_plugin)?;
    inventory::enable_kubeconfig_localhost(&cluster_settings)?;

    let mut group_vars =
        inventory::open_for_append(&inventory_layout.group_vars_file(cluster_inventory))?;

    let endpoint = resolve_endpoint(ctx.resolver.as_ref(), &domain_name).await?;
    info!("Resolved {} to {}", endpoint.domain_name, endpoint.address);

    inventory::write_load_balancer_settings(&mut group_vars, &endpoint)?;
    Ok(())
}

fn playbook_invocation(ctx: &ClusterContext, ssh_user: &str, os_label: &str) -> Invocation {
    Invocation::new(
        ANSIBLE_PLAYBOOK,
        [
            "-i".to_string(),
            ctx.layout.playbook_inventory(),
            CLUSTER_PLAYBOOK.to_string(),
            format!("--timeout={}", PLAYBOOK_TIMEOUT_SECS),
            "-e".to_string(),
            format!("ansible_user={}", ssh_user),
            "-e".to_string(),
            format!("bootstrap_os={}", os_label),
            "-b".to_string(),
            "--become-user=root".to_string(),
            "--flush-cache".to_string(),
        ],
        ctx.layout.root(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::testkit::{sample_config, FakeRunner, RecordingRenderer, StaticResolver};
    use std::sync::Arc;
    use tempfile::TempDir;

    const HOSTS: &str = "[all]\nmaster-0 ansible_host=10.250.192.10\n\n[all:vars]\napiserver_loadbalancer_domain_name=\"example.com\"\n";

    /// Kubespray checkout with a flat sample inventory and a terraform hosts file
    fn checkout(root: &Path, hosts: &str) {
        let group_vars = root.join("inventory/sample/group_vars");
        fs::create_dir_all(&group_vars).unwrap();
        fs::write(group_vars.join("all.yml"), "bootstrap_os: none\nkubeadm_enabled: false\n").unwrap();
        fs::write(
            group_vars.join("k8s-cluster.yml"),
            "kube_version: v1.10.2\nkube_network_plugin: calico\n",
        )
        .unwrap();
        fs::write(root.join("inventory/hosts"), hosts).unwrap();
    }

    fn context(root: &Path, runner: Arc<FakeRunner>) -> ClusterContext {
        let mut config = sample_config(root);
        config.kubespray.network_plugin = "flannel".to_string();
        ClusterContext::with_parts(
            config,
            runner,
            Arc::new(RecordingRenderer::default()),
            Arc::new(StaticResolver::new(&["10.0.0.5", "10.0.0.9"])),
        )
    }

    #[tokio::test]
    async fn test_install_prepares_inventory_and_runs_playbook() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        checkout(&root, HOSTS);
        let runner = Arc::new(FakeRunner::default());
        let ctx = context(&root, runner.clone());

        install_cluster(&ctx).await.unwrap();

        let cluster = root.join("inventory/awscluster");
        assert_eq!(fs::read_to_string(cluster.join("hosts")).unwrap(), HOSTS);

        let settings = fs::read_to_string(cluster.join("group_vars/k8s-cluster.yml")).unwrap();
        assert_eq!(
            settings,
            "kube_version: v1.10.2\nkube_network_plugin: flannel\nkubeconfig_localhost: true\n"
        );

        let group_vars = fs::read_to_string(cluster.join("group_vars/all.yml")).unwrap();
        assert!(group_vars.starts_with("bootstrap_os: none\n"));
        assert!(group_vars.contains("cloud_provider: 'aws'\n"));
        assert!(group_vars.contains("apiserver_loadbalancer_domain_name: \"example.com\"\n"));
        assert!(group_vars.contains("  address: 10.0.0.5\n"));
        assert!(!group_vars.contains("10.0.0.9"));
        assert!(group_vars.ends_with("  port: 6443\n"));

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        let playbook = &invocations[0];
        assert_eq!(playbook.program, "ansible-playbook");
        assert_eq!(playbook.working_dir, root);
        assert_eq!(
            playbook.args,
            vec![
                "-i",
                "./inventory/awscluster/hosts",
                "./cluster.yml",
                "--timeout=60",
                "-e",
                "ansible_user=centos",
                "-e",
                "bootstrap_os=centos",
                "-b",
                "--become-user=root",
                "--flush-cache",
            ]
        );
    }

    #[tokio::test]
    async fn test_second_install_does_not_append_again() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        checkout(&root, HOSTS);
        let runner = Arc::new(FakeRunner::default());
        let ctx = context(&root, runner.clone());
        let group_vars_path = root.join("inventory/awscluster/group_vars/all.yml");

        install_cluster(&ctx).await.unwrap();
        let first = fs::read_to_string(&group_vars_path).unwrap();
        install_cluster(&ctx).await.unwrap();
        let second = fs::read_to_string(&group_vars_path).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches("loadbalancer_apiserver:").count(), 1);
        assert_eq!(runner.invocations().len(), 2);
    }

    #[tokio::test]
    async fn test_install_without_domain_name_skips_endpoint() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        checkout(&root, "[all]\nmaster-0 ansible_host=10.250.192.10\n");
        let runner = Arc::new(FakeRunner::default());
        let ctx = context(&root, runner.clone());

        install_cluster(&ctx).await.unwrap();

        let group_vars =
            fs::read_to_string(root.join("inventory/awscluster/group_vars/all.yml")).unwrap();
        assert!(!group_vars.contains("loadbalancer_apiserver"));
        assert_eq!(runner.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_install_requires_hosts_file() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner::default());
        let ctx = context(&dir.path().join("kubespray"), runner.clone());

        let err = install_cluster(&ctx).await.unwrap_err();

        assert!(matches!(err, ClusterError::FileNotFound(_)));
        assert!(runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_install_requires_ansible() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        checkout(&root, HOSTS);
        let runner = Arc::new(FakeRunner::with_missing_tool("ansible"));
        let ctx = context(&root, runner.clone());

        let err = install_cluster(&ctx).await.unwrap_err();

        assert!(matches!(err, ClusterError::ToolNotFound { .. }));
        assert!(!root.join("inventory/awscluster").exists());
    }

    #[tokio::test]
    async fn test_install_unresolvable_endpoint_is_fatal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        checkout(&root, HOSTS);
        let runner = Arc::new(FakeRunner::default());
        let ctx = ClusterContext::with_parts(
            sample_config(&root),
            runner.clone(),
            Arc::new(RecordingRenderer::default()),
            Arc::new(StaticResolver::new(&[])),
        );

        let err = install_cluster(&ctx).await.unwrap_err();

        assert!(matches!(err, ClusterError::Resolution { .. }));
        assert!(runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_failed_preparation_leaves_inventory_for_operator() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        checkout(&root, HOSTS);
        let failing = ClusterContext::with_parts(
            sample_config(&root),
            Arc::new(FakeRunner::default()),
            Arc::new(RecordingRenderer::default()),
            Arc::new(StaticResolver::new(&[])),
        );

        assert!(install_cluster(&failing).await.is_err());

        let group_vars_path = root.join("inventory/awscluster/group_vars/all.yml");
        assert!(group_vars_path.exists());

        // The next run reuses the directory without retrying the endpoint settings.
        let runner = Arc::new(FakeRunner::default());
        install_cluster(&context(&root, runner.clone())).await.unwrap();
        let group_vars = fs::read_to_string(&group_vars_path).unwrap();
        assert!(!group_vars.contains("loadbalancer_apiserver"));
        assert_eq!(runner.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_install_enables_kubeadm_in_sample() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        checkout(&root, HOSTS);
        let runner = Arc::new(FakeRunner::default());
        let mut ctx = context(&root, runner);
        ctx.config.kubespray.kubeadm_enabled = true;

        install_cluster(&ctx).await.unwrap();

        let sample = fs::read_to_string(root.join("inventory/sample/group_vars/all.yml")).unwrap();
        assert!(sample.contains("kubeadm_enabled: true"));
        let cluster =
            fs::read_to_string(root.join("inventory/awscluster/group_vars/all.yml")).unwrap();
        assert!(cluster.contains("kubeadm_enabled: true"));
    }

    #[tokio::test]
    async fn test_install_nested_layout() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("kubespray");
        let group_vars = root.join("inventory/sample/group_vars");
        fs::create_dir_all(group_vars.join("all")).unwrap();
        fs::create_dir_all(group_vars.join("k8s-cluster")).unwrap();
        fs::write(group_vars.join("all/all.yml"), "bootstrap_os: none\n").unwrap();
        fs::write(
            group_vars.join("k8s-cluster/k8s-cluster.yml"),
            "kube_network_plugin: calico\n",
        )
        .unwrap();
        fs::write(root.join("inventory/hosts"), HOSTS).unwrap();

        let mut config = sample_config(&root);
        config.kubespray.version = "develop".to_string();
        let ctx = ClusterContext::with_parts(
            config,
            Arc::new(FakeRunner::default()),
            Arc::new(RecordingRenderer::default()),
            Arc::new(StaticResolver::new(&["10.0.0.5"])),
        );

        install_cluster(&ctx).await.unwrap();

        let cluster = root.join("inventory/awscluster/group_vars");
        let settings = fs::read_to_string(cluster.join("k8s-cluster/k8s-cluster.yml")).unwrap();
        assert!(settings.ends_with("kubeconfig_localhost: true\n"));
        let all = fs::read_to_string(cluster.join("all/all.yml")).unwrap();
        assert!(all.contains("  address: 10.0.0.5\n"));
    }
}
