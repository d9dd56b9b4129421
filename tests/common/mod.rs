//! Shared utilities for integration tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ingress_synth::backend::BackendEndpoint;
use ingress_synth::model::{Route, RoutePath, RouteRule};
use ingress_synth::resolver::{CertificateResolver, ResolveError, ResolvedCertificate};

pub const PREFIX: &str = "ingress.kubernetes.io";

/// Resolver answering from a fixed table and counting calls.
#[derive(Default)]
pub struct StaticResolver {
    certificates: BTreeMap<String, Arc<ResolvedCertificate>>,
    pub calls: AtomicUsize,
}

impl StaticResolver {
    pub fn with(mut self, secret: &str, pem_sha: &str) -> Self {
        self.certificates.insert(secret.to_string(), certificate(secret, pem_sha));
        self
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateResolver for StaticResolver {
    async fn resolve(&self, secret: &str) -> Result<Arc<ResolvedCertificate>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.certificates
            .get(secret)
            .cloned()
            .ok_or_else(|| ResolveError::NoCertificate(secret.to_string()))
    }
}

/// Resolver that never answers in time.
#[allow(dead_code)]
pub struct HangingResolver;

#[async_trait]
impl CertificateResolver for HangingResolver {
    async fn resolve(&self, _secret: &str) -> Result<Arc<ResolvedCertificate>, ResolveError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ResolveError::NoCertificate("unreachable".into()))
    }
}

pub fn certificate(secret: &str, pem_sha: &str) -> Arc<ResolvedCertificate> {
    Arc::new(ResolvedCertificate {
        secret: secret.to_string(),
        ca_file_name: format!("/var/lib/ingress/secrets/{secret}/ca.crt"),
        pem_sha: pem_sha.to_string(),
    })
}

/// Route `namespace/name` serving `host` with `(path, backend)` pairs and
/// the given unprefixed annotations.
#[allow(dead_code)]
pub fn route(
    namespace: &str,
    name: &str,
    host: &str,
    paths: &[(&str, &str)],
    annotations: &[(&str, &str)],
) -> Route {
    Route {
        namespace: namespace.to_string(),
        name: name.to_string(),
        annotations: annotations
            .iter()
            .map(|(k, v)| (format!("{PREFIX}/{k}"), v.to_string()))
            .collect(),
        rules: vec![RouteRule {
            host: host.to_string(),
            paths: paths
                .iter()
                .map(|(path, backend)| RoutePath {
                    path: path.to_string(),
                    backend: backend.to_string(),
                })
                .collect(),
        }],
    }
}

#[allow(dead_code)]
pub fn endpoints(addresses: &[&str], port: u16) -> Vec<BackendEndpoint> {
    addresses.iter().map(|a| BackendEndpoint::new(*a, port)).collect()
}
