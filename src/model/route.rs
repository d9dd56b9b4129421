//! Routing resources as delivered by the cluster watcher.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A routing resource: host rules plus the annotations configuring them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Route {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: Vec<RouteRule>,
}

impl Route {
    /// `namespace/name`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteRule {
    pub host: String,
    #[serde(default)]
    pub paths: Vec<RoutePath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoutePath {
    #[serde(default = "default_path")]
    pub path: String,
    pub backend: String,
}

fn default_path() -> String {
    "/".to_string()
}
