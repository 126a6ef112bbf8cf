// file: src/cluster/endpoint.rs
// version: 1.0.0
// guid: 47f2c8d0-a9b3-4e61-8d25-b1e0f6c73a98

//! API load balancer discovery and name resolution

use crate::{ClusterError, Result};
use async_trait::async_trait;
use std::net::IpAddr;
use tracing::debug;

/// Key terraform writes into the generated inventory
const DOMAIN_NAME_KEY: &str = "apiserver_loadbalancer_domain_name=";

/// Load balancer name and the address picked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub domain_name: String,
    pub address: IpAddr,
}

/// Resolves host names to addresses
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<Vec<IpAddr>>;
}

/// Resolver backed by the system name service
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl EndpointResolver for DnsResolver {
    async fn lookup(&self, name: &str) -> Result<Vec<IpAddr>> {
        let addresses = tokio::net::lookup_host((name, 0))
            .await
            .map_err(|e| ClusterError::Resolution {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(addresses.map(|addr| addr.ip()).collect())
    }
}

/// Pull the load balancer domain name out of an inventory hosts file
///
/// Surrounding whitespace and quote characters are removed.
pub fn extract_domain_name(hosts: &str) -> Option<String> {
    let line = hosts.lines().find(|line| line.contains(DOMAIN_NAME_KEY))?;
    let value = line.split('=').nth(1)?;
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Resolve the domain name and keep the first address returned
pub async fn resolve_endpoint(
    resolver: &dyn EndpointResolver,
    domain_name: &str,
) -> Result<ResolvedEndpoint> {
    let addresses = resolver.lookup(domain_name).await?;
    debug!("{} resolved to {:?}", domain_name, addresses);

    let address = addresses
        .first()
        .copied()
        .ok_or_else(|| ClusterError::Resolution {
            name: domain_name.to_string(),
            reason: "no addresses returned".to_string(),
        })?;

    Ok(ResolvedEndpoint {
        domain_name: domain_name.to_string(),
        address,
    })
}
