//! Certificate resolution subsystem.
//!
//! # Data Flow
//! ```text
//! auth-tls-secret annotation value
//!     → secret_ref.rs (validate namespace/name)
//!     → CertificateResolver::resolve (external store, cached)
//!     → Arc<ResolvedCertificate> shared by every fragment that uses it
//! ```
//!
//! # Design Decisions
//! - The store sits behind a narrow async trait; the core never talks to it
//!   directly
//! - Every call is bounded by a timeout; a timeout is a resolution failure
//! - Resolved certificates are owned by the resolver cache and shared by Arc

pub mod file;
pub mod secret_ref;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use file::FileCertificateResolver;
pub use secret_ref::{SecretRef, SecretRefError};

/// Identity of a CA bundle made available to the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedCertificate {
    /// Secret reference the bundle was resolved from.
    pub secret: String,
    /// File the proxy reads the bundle from.
    pub ca_file_name: String,
    /// Hex SHA-256 of the bundle content.
    pub pem_sha: String,
}

/// Errors that can occur while resolving trust material.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidReference(#[from] SecretRefError),

    #[error("secret {secret} not found at {}", .path.display())]
    NotFound { secret: String, path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret {0} does not contain a PEM certificate")]
    NoCertificate(String),

    #[error("resolving secret {secret} timed out after {timeout_ms}ms")]
    Timeout { secret: String, timeout_ms: u64 },
}

/// Access to the external secret store.
///
/// Must be safe to call concurrently with distinct arguments.
#[async_trait]
pub trait CertificateResolver: Send + Sync {
    async fn resolve(&self, secret: &str) -> Result<Arc<ResolvedCertificate>, ResolveError>;
}

/// Resolve `secret`, failing with [`ResolveError::Timeout`] once `timeout`
/// elapses. Dropping the returned future cancels the lookup.
pub async fn resolve_with_timeout(
    resolver: &dyn CertificateResolver,
    secret: &str,
    timeout: Duration,
) -> Result<Arc<ResolvedCertificate>, ResolveError> {
    match tokio::time::timeout(timeout, resolver.resolve(secret)).await {
        Ok(result) => result,
        Err(_) => Err(ResolveError::Timeout {
            secret: secret.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
