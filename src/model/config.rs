//! Render-ready configuration model.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::annotations::TlsClientAuthConfig;
use crate::backend::BackendView;
use crate::config::ProxySettings;
use crate::render::functions::is_wildcard_hostname;

/// Root aggregate handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalConfig {
    pub settings: ProxySettings,
    /// Virtual hosts, exact names first.
    pub hosts: Vec<HostRecord>,
    /// Host answering requests that match no other host.
    pub default_server: Option<HostRecord>,
    pub backends: BTreeMap<String, BackendView>,
}

impl GlobalConfig {
    pub fn new(settings: ProxySettings) -> Self {
        Self {
            settings,
            hosts: Vec::new(),
            default_server: None,
            backends: BTreeMap::new(),
        }
    }

    pub fn host(&self, hostname: &str) -> Option<&HostRecord> {
        self.hosts.iter().find(|h| h.hostname == hostname)
    }

    /// Order hosts so exact names are matched before wildcards.
    pub fn sort_hosts(&mut self) {
        self.hosts
            .sort_by(|a, b| (a.is_wildcard(), &a.hostname).cmp(&(b.is_wildcard(), &b.hostname)));
    }
}

/// A virtual host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRecord {
    pub hostname: String,
    /// Hostname usable as an identifier in the proxy grammar.
    pub hostname_label: String,
    pub alias: Option<String>,
    pub is_default_server: bool,
    /// Set when the host verifies client certificates and therefore needs a
    /// dedicated frontend.
    pub is_ca_cert: bool,
    pub ssl_redirect: bool,
    /// `Strict-Transport-Security` value, set only when HSTS is enabled.
    pub hsts_header: Option<String>,
    pub certificate_auth: Option<TlsClientAuthConfig>,
    /// Longest path first.
    pub locations: Vec<LocationRecord>,
}

impl HostRecord {
    pub fn new(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Self {
            hostname_label: hostname_label(&hostname),
            hostname,
            alias: None,
            is_default_server: false,
            is_ca_cert: false,
            ssl_redirect: false,
            hsts_header: None,
            certificate_auth: None,
            locations: Vec::new(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        is_wildcard_hostname(&self.hostname)
    }

    pub fn location(&self, path: &str) -> Option<&LocationRecord> {
        self.locations.iter().find(|l| l.path == path)
    }

    pub fn root_location(&self) -> Option<&LocationRecord> {
        self.locations.iter().find(|l| l.is_root_location)
    }

    pub fn sort_locations(&mut self) {
        self.locations
            .sort_by(|a, b| (Reverse(a.path.len()), &a.path).cmp(&(Reverse(b.path.len()), &b.path)));
    }
}

/// A path of a virtual host routed to a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    pub path: String,
    pub backend: String,
    pub is_root_location: bool,
    /// Allowed sources in `src` ACL form.
    pub whitelist: Option<String>,
    /// Reason the location's access rules could not be built. A denied
    /// location rejects every request instead of falling back to allow all.
    pub denied: Option<String>,
}

impl LocationRecord {
    pub fn new(path: impl Into<String>, backend: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            is_root_location: path == "/",
            path,
            backend: backend.into(),
            whitelist: None,
            denied: None,
        }
    }
}

fn hostname_label(hostname: &str) -> String {
    hostname
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
