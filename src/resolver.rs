//! Reverse-DNS resolution for connecting clients.
//!
//! Lookups run off the connection task; completion is delivered back as
//! an event that unblocks the session's signon. The trait seam keeps the
//! blocking-capable worker out of the event loop and lets tests supply a
//! deterministic implementation.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use tracing::debug;

/// Cap on how long a client may sit in the lookup state.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-method hostname worker: `resolve(addr) -> name | none`.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, addr: IpAddr) -> Option<String>;
}

/// PTR lookups through the system resolver.
pub struct DnsResolver {
    inner: TokioResolver,
}

impl DnsResolver {
    pub fn new() -> DnsResolver {
        // Try system config, fall back to defaults
        let inner = TokioResolver::builder_tokio()
            .map(|builder| builder.build())
            .unwrap_or_else(|_| {
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .build()
            });
        DnsResolver { inner }
    }
}

impl Default for DnsResolver {
    fn default() -> DnsResolver {
        DnsResolver::new()
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn resolve(&self, addr: IpAddr) -> Option<String> {
        let lookup = self.inner.reverse_lookup(addr);
        match tokio::time::timeout(RESOLVE_TIMEOUT, lookup).await {
            Ok(Ok(names)) => names
                .iter()
                .next()
                .map(|name| name.to_utf8().trim_end_matches('.').to_string()),
            Ok(Err(e)) => {
                debug!(addr = %addr, error = %e, "reverse lookup failed");
                None
            }
            Err(_) => {
                debug!(addr = %addr, "reverse lookup timed out");
                None
            }
        }
    }
}

/// Used when lookups are disabled: resolves nothing, so sessions keep
/// their numeric address but still walk the lookup states.
pub struct NoResolver;

#[async_trait]
impl Resolver for NoResolver {
    async fn resolve(&self, _addr: IpAddr) -> Option<String> {
        None
    }
}
