//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the controller.
//! All types derive Serde traits for deserialization from config files.
//! [`ProxySettings`] is also serialized into the render context, so its field
//! names are part of the template contract.

use serde::{Deserialize, Serialize};

/// Root configuration for the ingress controller core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ControllerConfig {
    /// Controller behavior (annotation prefix, secrets, defaults).
    pub controller: ControllerSettings,

    /// Global proxy settings exposed to the template.
    pub proxy: ProxySettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Controller-side settings that never reach the rendered document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Prefix every annotation key is namespaced under.
    pub annotation_prefix: String,

    /// Namespace used for bare secret references.
    pub default_namespace: String,

    /// Directory holding CA bundles as `<namespace>/<name>/ca.crt`.
    pub secrets_dir: String,

    /// Upper bound for a single certificate resolution.
    pub resolver_timeout_ms: u64,

    /// Backend serving requests that match no host.
    pub default_backend: Option<String>,

    /// Default for the `ssl-redirect` annotation.
    pub ssl_redirect: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            annotation_prefix: "ingress.kubernetes.io".to_string(),
            default_namespace: "default".to_string(),
            secrets_dir: "/var/lib/ingress/secrets".to_string(),
            resolver_timeout_ms: 2000,
            default_backend: None,
            ssl_redirect: true,
        }
    }
}

/// Global proxy settings, rendered as-is by the template.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxySettings {
    pub ssl_ciphers: String,
    pub ssl_options: String,
    pub timeouts: ProxyTimeouts,
    pub syslog_endpoint: String,
    pub balance_algorithm: String,
    pub backend_check_interval: String,
    pub forwardfor: String,
    pub max_connections: u32,
    /// Request body limit with an optional `k`/`m`/`g` suffix.
    pub proxy_body_size: String,
    pub http_log_format: String,
    pub https_log_format: String,
    pub tcp_log_format: String,
    pub use_proxy_protocol: bool,

    /// Number of server slots added whenever a backend runs out of empty ones.
    pub backend_server_slots_increment: usize,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            ssl_ciphers: "ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256".to_string(),
            ssl_options: "no-sslv3 no-tls-tickets".to_string(),
            timeouts: ProxyTimeouts::default(),
            syslog_endpoint: String::new(),
            balance_algorithm: "roundrobin".to_string(),
            backend_check_interval: "2s".to_string(),
            forwardfor: "add".to_string(),
            max_connections: 2000,
            proxy_body_size: String::new(),
            http_log_format: String::new(),
            https_log_format: String::new(),
            tcp_log_format: String::new(),
            use_proxy_protocol: false,
            backend_server_slots_increment: 32,
        }
    }
}

/// Proxy timeouts, kept as strings because the proxy grammar owns their units.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyTimeouts {
    pub http_request: String,
    pub connect: String,
    pub client: String,
    pub client_fin: String,
    pub server: String,
    pub server_fin: String,
    pub tunnel: String,
    pub keep_alive: String,
}

impl Default for ProxyTimeouts {
    fn default() -> Self {
        Self {
            http_request: "5s".to_string(),
            connect: "5s".to_string(),
            client: "50s".to_string(),
            client_fin: "50s".to_string(),
            server: "50s".to_string(),
            server_fin: "50s".to_string(),
            tunnel: "1h".to_string(),
            keep_alive: "1m".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
