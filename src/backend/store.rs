//! Slot table store.
//!
//! # Responsibilities
//! - Keep every backend's slot table across reconciliation cycles
//! - Serialize reconciliations of the same backend
//! - Forget backends removed from the model

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;

use crate::backend::endpoint::BackendEndpoint;
use crate::backend::slots::{BackendSlotTable, BackendView};
use crate::observability::metrics;

/// Slot tables keyed by backend name.
///
/// Each table sits behind its own mutex, so two reconciliations of one
/// backend run one after the other while different backends proceed in
/// parallel. Cloning the store shares the tables.
///
/// A poisoned table lock is taken over as is: the table's precondition
/// panics fire before it is touched, so a panicking caller leaves it intact.
#[derive(Debug, Clone)]
pub struct SlotStore {
    tables: Arc<DashMap<String, Arc<Mutex<BackendSlotTable>>>>,
    increment: usize,
}

impl SlotStore {
    /// Create an empty store growing slot pools by `increment`.
    pub fn new(increment: usize) -> Self {
        assert!(increment > 0, "backend server slot increment must be at least 1");
        Self {
            tables: Arc::new(DashMap::new()),
            increment,
        }
    }

    /// Reconcile a backend against its current endpoints, creating its table
    /// on first sight, and return the resulting template view.
    ///
    /// # Panics
    /// If `endpoints` holds the same `address:port` twice.
    pub fn reconcile(&self, backend: &str, endpoints: &[BackendEndpoint]) -> BackendView {
        let table = Arc::clone(self.tables.entry(backend.to_string()).or_default().value());
        let mut table = lock(&table);

        let delta = table.reconcile(endpoints, self.increment);
        if delta.grown > 0 {
            tracing::info!(
                backend = %backend,
                grown = delta.grown,
                capacity = table.capacity(),
                "Backend slot pool grown"
            );
        }
        if !delta.assigned.is_empty() || !delta.released.is_empty() {
            tracing::debug!(
                backend = %backend,
                assigned = ?delta.assigned,
                released = ?delta.released,
                "Backend slots rebound"
            );
        }
        metrics::record_backend_slots(backend, table.capacity(), table.full_slots().len());

        BackendView {
            name: backend.to_string(),
            servers: table.servers(),
        }
    }

    /// Copy of a backend's current table.
    pub fn snapshot(&self, backend: &str) -> Option<BackendSlotTable> {
        let table = self.tables.get(backend).map(|entry| Arc::clone(entry.value()))?;
        let table = lock(&table);
        Some(table.clone())
    }

    /// Drop a backend's table. Returns true if it existed.
    pub fn remove(&self, backend: &str) -> bool {
        let removed = self.tables.remove(backend).is_some();
        if removed {
            tracing::info!(backend = %backend, "Backend slot table removed");
        }
        removed
    }

    /// Drop every table whose backend is not in `live`.
    pub fn retain(&self, live: &HashSet<String>) {
        let stale: Vec<String> = self
            .tables
            .iter()
            .filter(|entry| !live.contains(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        for backend in stale {
            self.remove(&backend);
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn lock(table: &Mutex<BackendSlotTable>) -> MutexGuard<'_, BackendSlotTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_persist_between_cycles() {
        let store = SlotStore::new(2);
        let endpoints = vec![BackendEndpoint::new("10.0.0.1", 80)];

        let first = store.reconcile("web", &endpoints);
        let second = store.reconcile("web", &endpoints);
        assert_eq!(first, second);
        assert_eq!(first.servers.len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retain_drops_stale_backends() {
        let store = SlotStore::new(1);
        store.reconcile("web", &[BackendEndpoint::new("10.0.0.1", 80)]);
        store.reconcile("api", &[BackendEndpoint::new("10.0.0.2", 80)]);

        store.retain(&HashSet::from(["api".to_string()]));
        assert!(store.snapshot("web").is_none());
        assert!(store.snapshot("api").is_some());

        // A re-added backend starts from scratch.
        let view = store.reconcile("web", &[BackendEndpoint::new("10.0.0.3", 80)]);
        assert_eq!(view.servers[0].endpoint, Some(BackendEndpoint::new("10.0.0.3", 80)));
    }

    #[test]
    fn test_concurrent_reconciles_same_backend() {
        let store = SlotStore::new(1);
        let endpoints: Vec<_> = (1..=8)
            .map(|i| BackendEndpoint::new(format!("10.0.0.{i}"), 80))
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| store.reconcile("web", &endpoints));
            }
        });

        let table = store.snapshot("web").unwrap();
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.full_slots().len(), 8);
    }

    #[test]
    fn test_table_survives_panicking_reconcile() {
        let store = SlotStore::new(2);
        store.reconcile("web", &[BackendEndpoint::new("10.0.0.1", 80)]);

        let duplicated = vec![BackendEndpoint::new("10.0.0.2", 80); 2];
        let outcome = std::thread::scope(|scope| scope.spawn(|| store.reconcile("web", &duplicated)).join());
        assert!(outcome.is_err());

        let table = store.snapshot("web").unwrap();
        assert_eq!(table.server_for("10.0.0.1:80"), Some("srv1"));

        let view = store.reconcile(
            "web",
            &[BackendEndpoint::new("10.0.0.1", 80), BackendEndpoint::new("10.0.0.2", 80)],
        );
        assert_eq!(view.servers[1].endpoint, Some(BackendEndpoint::new("10.0.0.2", 80)));
    }
}
