//! TLS client authentication (`auth-tls-*` annotations).
//!
//! # Responsibilities
//! - Validate the CA secret reference
//! - Default the optional knobs (header, verify mode, depth, error page)
//! - Resolve the CA bundle last, failing closed
//!
//! # Design Decisions
//! - A missing, empty or malformed secret denies the feature
//! - Certificate resolution failures deny the feature; there is no
//!   placeholder certificate
//! - Malformed optional knobs fall back to their strictest default
//!   (`verify on`, depth 1); only the header injection defaults to off

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::annotations::error::AnnotationError;
use crate::annotations::parser::Annotations;
use crate::annotations::{AnnotationParser, Fragment};
use crate::model::Route;
use crate::resolver::{resolve_with_timeout, CertificateResolver, ResolvedCertificate, SecretRef};

pub const AUTH_TLS_SECRET: &str = "auth-tls-secret";
pub const AUTH_TLS_CERT_HEADER: &str = "auth-tls-cert-header";
pub const AUTH_TLS_VERIFY_CLIENT: &str = "auth-tls-verify-client";
pub const AUTH_TLS_VERIFY_DEPTH: &str = "auth-tls-verify-depth";
pub const AUTH_TLS_ERROR_PAGE: &str = "auth-tls-error-page";

const KEYS: [&str; 5] = [
    AUTH_TLS_SECRET,
    AUTH_TLS_CERT_HEADER,
    AUTH_TLS_VERIFY_CLIENT,
    AUTH_TLS_VERIFY_DEPTH,
    AUTH_TLS_ERROR_PAGE,
];

const DEFAULT_VERIFY_DEPTH: u32 = 1;

/// Client certificate verification mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyClient {
    #[default]
    On,
    Off,
    Optional,
    OptionalNoCa,
}

impl VerifyClient {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyClient::On => "on",
            VerifyClient::Off => "off",
            VerifyClient::Optional => "optional",
            VerifyClient::OptionalNoCa => "optional_no_ca",
        }
    }
}

impl FromStr for VerifyClient {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(VerifyClient::On),
            "off" => Ok(VerifyClient::Off),
            "optional" => Ok(VerifyClient::Optional),
            "optional_no_ca" => Ok(VerifyClient::OptionalNoCa),
            _ => Err(()),
        }
    }
}

impl fmt::Display for VerifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutual TLS settings of a host.
///
/// Equality includes the certificate identity, so a rotated CA bundle makes
/// an otherwise identical fragment different.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsClientAuthConfig {
    pub certificate: Arc<ResolvedCertificate>,
    pub cert_header: bool,
    pub verify_client: VerifyClient,
    pub verify_depth: u32,
    pub error_page: String,
}

/// Parser for the `auth-tls-*` annotation family.
pub struct AuthTlsParser {
    prefix: String,
    resolver: Arc<dyn CertificateResolver>,
    timeout: Duration,
}

impl AuthTlsParser {
    pub fn new(prefix: impl Into<String>, resolver: Arc<dyn CertificateResolver>, timeout: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            resolver,
            timeout,
        }
    }

    /// Build the client auth fragment of a route.
    pub async fn parse_client_auth(&self, route: &Route) -> Result<TlsClientAuthConfig, AnnotationError> {
        let ann = Annotations::new(&self.prefix, route);

        let secret = match ann.get_string(AUTH_TLS_SECRET) {
            Ok(secret) if !secret.is_empty() => secret,
            _ => return Err(AnnotationError::denied("an empty string is not a valid secret name")),
        };

        SecretRef::parse(secret).map_err(|e| AnnotationError::denied(e.to_string()))?;

        let cert_header = ann.get_bool(AUTH_TLS_CERT_HEADER).unwrap_or(false);

        let verify_client = ann
            .get_string(AUTH_TLS_VERIFY_CLIENT)
            .ok()
            .and_then(|v| v.parse::<VerifyClient>().ok())
            .unwrap_or_default();

        let verify_depth = ann
            .get_int(AUTH_TLS_VERIFY_DEPTH)
            .ok()
            .filter(|depth| *depth > 0)
            .and_then(|depth| u32::try_from(depth).ok())
            .unwrap_or(DEFAULT_VERIFY_DEPTH);

        let certificate = resolve_with_timeout(self.resolver.as_ref(), secret, self.timeout)
            .await
            .map_err(|e| AnnotationError::denied_by("error obtaining certificate", e))?;

        let error_page = ann
            .get_string(AUTH_TLS_ERROR_PAGE)
            .map(str::to_string)
            .unwrap_or_default();

        Ok(TlsClientAuthConfig {
            certificate,
            cert_header,
            verify_client,
            verify_depth,
            error_page,
        })
    }
}

#[async_trait]
impl AnnotationParser for AuthTlsParser {
    fn name(&self) -> &'static str {
        "auth-tls"
    }

    fn is_requested(&self, route: &Route) -> bool {
        Annotations::new(&self.prefix, route).contains_any(&KEYS)
    }

    async fn parse(&self, route: &Route) -> Result<Fragment, AnnotationError> {
        self.parse_client_auth(route).await.map(Fragment::TlsClientAuth)
    }
}
