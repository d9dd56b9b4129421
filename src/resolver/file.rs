//! File-backed certificate resolver.
//!
//! CA bundles are expected as `<root>/<namespace>/<name>/ca.crt`, the layout a
//! secret volume sync produces. The proxy reads the same file, so the
//! resolved path is what ends up in the rendered document.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::resolver::{CertificateResolver, ResolveError, ResolvedCertificate, SecretRef};

const CA_FILE: &str = "ca.crt";

/// Resolver reading PEM bundles from a directory tree, caching by secret.
#[derive(Debug)]
pub struct FileCertificateResolver {
    root: PathBuf,
    default_namespace: String,
    cache: DashMap<String, Arc<ResolvedCertificate>>,
}

impl FileCertificateResolver {
    pub fn new(root: impl Into<PathBuf>, default_namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            default_namespace: default_namespace.into(),
            cache: DashMap::new(),
        }
    }

    fn bundle_path(&self, reference: &SecretRef) -> PathBuf {
        self.root
            .join(reference.namespace_or(&self.default_namespace))
            .join(&reference.name)
            .join(CA_FILE)
    }

    /// Last certificate resolved for `secret` (`namespace/name` form).
    pub fn cached(&self, secret: &str) -> Option<Arc<ResolvedCertificate>> {
        self.cache.get(secret).map(|entry| Arc::clone(entry.value()))
    }
}

#[async_trait]
impl CertificateResolver for FileCertificateResolver {
    async fn resolve(&self, secret: &str) -> Result<Arc<ResolvedCertificate>, ResolveError> {
        let reference = SecretRef::parse(secret)?;
        let key = format!(
            "{}/{}",
            reference.namespace_or(&self.default_namespace),
            reference.name
        );
        let path = self.bundle_path(&reference);

        let pem = match tokio::fs::read(&path).await {
            Ok(pem) => pem,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResolveError::NotFound { secret: key, path });
            }
            Err(source) => return Err(ResolveError::Io { path, source }),
        };

        let certs = rustls_pemfile::certs(&mut pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ResolveError::Io {
                path: path.clone(),
                source,
            })?;
        if certs.is_empty() {
            return Err(ResolveError::NoCertificate(key));
        }

        let pem_sha = hex::encode(Sha256::digest(&pem));
        if let Some(cached) = self.cached(&key) {
            if cached.pem_sha == pem_sha {
                return Ok(cached);
            }
        }

        tracing::debug!(
            secret = %key,
            path = %path.display(),
            certificates = certs.len(),
            "CA bundle resolved"
        );
        let resolved = Arc::new(ResolvedCertificate {
            secret: key.clone(),
            ca_file_name: path.display().to_string(),
            pem_sha,
        });
        self.cache.insert(key, Arc::clone(&resolved));
        Ok(resolved)
    }
}
