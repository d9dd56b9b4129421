//! Cluster state read from a snapshot file.
//!
//! Stands in for the watcher: a TOML document with the routes and the
//! endpoint set of every backend.
//!
//! ```toml
//! [[routes]]
//! namespace = "shop"
//! name = "web"
//!
//! [[routes.rules]]
//! host = "shop.example.com"
//! paths = [{ path = "/", backend = "shop-web-8080" }]
//!
//! [endpoints]
//! shop-web-8080 = [{ address = "10.0.0.1", port = 8080 }]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendEndpoint;
use crate::model::Route;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Routes and endpoints observed at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterSnapshot {
    pub routes: Vec<Route>,
    pub endpoints: BTreeMap<String, Vec<BackendEndpoint>>,
}

impl ClusterSnapshot {
    pub fn parse(content: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: ClusterSnapshot = toml::from_str(content)?;
        snapshot.dedup_endpoints();
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn endpoints_of(&self, backend: &str) -> &[BackendEndpoint] {
        self.endpoints.get(backend).map(Vec::as_slice).unwrap_or_default()
    }

    /// The slot allocator rejects duplicate endpoints; watcher data may
    /// contain them, so they are dropped here.
    fn dedup_endpoints(&mut self) {
        for (backend, endpoints) in &mut self.endpoints {
            let before = endpoints.len();
            endpoints.sort();
            endpoints.dedup();
            if endpoints.len() != before {
                tracing::warn!(
                    backend = %backend,
                    dropped = before - endpoints.len(),
                    "Duplicate endpoints dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = ClusterSnapshot::parse(
            r#"
            [[routes]]
            namespace = "shop"
            name = "web"

            [[routes.rules]]
            host = "shop.example.com"
            paths = [{ path = "/api", backend = "shop-api-80" }, { backend = "shop-web-80" }]

            [endpoints]
            shop-web-80 = [
                { address = "10.0.0.2", port = 80 },
                { address = "10.0.0.1", port = 80 },
                { address = "10.0.0.2", port = 80 },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(snapshot.routes.len(), 1);
        assert_eq!(snapshot.routes[0].rules[0].paths[1].path, "/");
        assert_eq!(
            snapshot.endpoints_of("shop-web-80"),
            [BackendEndpoint::new("10.0.0.1", 80), BackendEndpoint::new("10.0.0.2", 80)]
        );
        assert!(snapshot.endpoints_of("shop-api-80").is_empty());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ClusterSnapshot::parse("routes = 3"),
            Err(SnapshotError::Parse(_))
        ));
        assert!(matches!(
            ClusterSnapshot::load(Path::new("/nonexistent/snapshot.toml")),
            Err(SnapshotError::Io { .. })
        ));
    }
}
