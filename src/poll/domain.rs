//! Waiting for a freshly provisioned domain to resolve.

use std::net::IpAddr;

use async_trait::async_trait;
use tracing::info;

use crate::error::ApiError;
use crate::poll::retry::{retry, RetryPolicy};

#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ApiError>;
}

/// System DNS lookup through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl DomainResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ApiError> {
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 443))
            .await?
            .map(|addr| addr.ip())
            .collect();
        if addrs.is_empty() {
            return Err(ApiError::DomainUnresolved(host.to_string()));
        }
        Ok(addrs)
    }
}

/// Retry `resolver` until `host` resolves. Accepts bare hosts or URLs.
pub async fn wait_for_domain(
    resolver: &dyn DomainResolver,
    host: &str,
    policy: RetryPolicy,
) -> Result<Vec<IpAddr>, ApiError> {
    let host = host_of(host);
    let addrs = retry("domain resolution", policy, move || resolver.resolve(host))
        .await
        .map_err(|err| match err {
            ApiError::RetryExhausted { .. } => ApiError::DomainUnresolved(host.to_string()),
            other => other,
        })?;
    info!(host = %host, addresses = addrs.len(), "domain resolved");
    Ok(addrs)
}

fn host_of(value: &str) -> &str {
    let without_scheme = value
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(value);
    without_scheme
        .split(['/', ':'])
        .next()
        .unwrap_or(without_scheme)
}
