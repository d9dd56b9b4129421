//! Per-backend server slot table.
//!
//! # Responsibilities
//! - Bind endpoints to stable server names ("slots")
//! - Release slots of vanished endpoints and reuse them FIFO
//! - Hand a returning endpoint its old slot if nobody took it meanwhile
//! - Grow the slot pool by a fixed increment, never shrink it
//!
//! # Design Decisions
//! - Reconciliation is idempotent and independent of input order
//! - Empty slots stay in the rendered document so small endpoint dips do not
//!   change the backend's shape
//! - Broken preconditions (zero increment, duplicate endpoints) panic: they
//!   would corrupt the rendered document

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::backend::endpoint::BackendEndpoint;

const SLOT_PREFIX: &str = "srv";

fn slot_name(index: usize) -> String {
    format!("{SLOT_PREFIX}{index}")
}

fn slot_index(name: &str) -> usize {
    name.strip_prefix(SLOT_PREFIX)
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}

/// A server name together with the endpoint currently occupying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSlot {
    pub server_name: String,
    pub endpoint: BackendEndpoint,
}

/// One server line of a rendered backend. Empty slots have no endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendServer {
    pub name: String,
    pub endpoint: Option<BackendEndpoint>,
}

/// Template view of a backend: its name and stable, ordered server list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendView {
    pub name: String,
    pub servers: Vec<BackendServer>,
}

/// Changes applied by a single reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotDelta {
    /// `(server name, endpoint key)` pairs newly bound.
    pub assigned: Vec<(String, String)>,
    /// `(server name, endpoint key)` pairs returned to the empty pool.
    pub released: Vec<(String, String)>,
    /// Number of slots added to the pool.
    pub grown: usize,
}

impl SlotDelta {
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty() && self.released.is_empty() && self.grown == 0
    }
}

/// Slot assignment state of one backend.
///
/// `full_slots` and `empty_slots` partition the `capacity` server names.
/// Every name in `last_occupant` is an empty slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSlotTable {
    /// Endpoint key (`address:port`) → bound slot.
    full_slots: BTreeMap<String, BackendSlot>,
    /// Unbound server names, reused from the front.
    empty_slots: VecDeque<String>,
    /// Released server name → key of the endpoint that held it.
    last_occupant: BTreeMap<String, String>,
    capacity: usize,
}

impl BackendSlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of server names, bound or not.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn full_slots(&self) -> &BTreeMap<String, BackendSlot> {
        &self.full_slots
    }

    pub fn empty_slots(&self) -> &VecDeque<String> {
        &self.empty_slots
    }

    /// Server name currently bound to an endpoint key.
    pub fn server_for(&self, endpoint_key: &str) -> Option<&str> {
        self.full_slots
            .get(endpoint_key)
            .map(|slot| slot.server_name.as_str())
    }

    /// Bring the table in line with the observed endpoint set.
    ///
    /// Bindings of endpoints still present are kept untouched. Vanished
    /// endpoints release their slot to the back of the empty pool. A new
    /// endpoint first gets back the slot it last held, when that slot is
    /// still empty; the rest (in key order) take slots from the front of the
    /// pool, growing it by `increment` names whenever it runs dry.
    ///
    /// # Panics
    /// If `increment` is zero or `endpoints` holds the same `address:port` twice.
    pub fn reconcile(&mut self, endpoints: &[BackendEndpoint], increment: usize) -> SlotDelta {
        assert!(increment > 0, "backend server slot increment must be at least 1");

        let mut desired: BTreeMap<String, &BackendEndpoint> = BTreeMap::new();
        for endpoint in endpoints {
            let previous = desired.insert(endpoint.key(), endpoint);
            assert!(
                previous.is_none(),
                "duplicate endpoint {} in backend endpoint set",
                endpoint.key()
            );
        }

        let mut delta = SlotDelta::default();

        let gone: Vec<String> = self
            .full_slots
            .keys()
            .filter(|key| !desired.contains_key(*key))
            .cloned()
            .collect();
        let mut released: Vec<(String, BackendSlot)> = gone
            .into_iter()
            .filter_map(|key| self.full_slots.remove(&key).map(|slot| (key, slot)))
            .collect();
        released.sort_by_key(|(_, slot)| slot_index(&slot.server_name));
        for (key, slot) in released {
            self.empty_slots.push_back(slot.server_name.clone());
            self.last_occupant.insert(slot.server_name.clone(), key.clone());
            delta.released.push((slot.server_name, key));
        }

        let new: Vec<(String, &BackendEndpoint)> = desired
            .into_iter()
            .filter(|(key, _)| !self.full_slots.contains_key(key))
            .collect();

        let mut fresh = Vec::new();
        for (key, endpoint) in new {
            match self.take_previous_slot(&key) {
                Some(server_name) => self.bind(server_name, key, endpoint, &mut delta),
                None => fresh.push((key, endpoint)),
            }
        }

        for (key, endpoint) in fresh {
            if self.empty_slots.is_empty() {
                self.grow(increment);
                delta.grown += increment;
            }
            let Some(server_name) = self.empty_slots.pop_front() else {
                unreachable!("slot pool was just grown");
            };
            self.last_occupant.remove(&server_name);
            self.bind(server_name, key, endpoint, &mut delta);
        }

        debug_assert_eq!(self.full_slots.len() + self.empty_slots.len(), self.capacity);
        delta
    }

    /// Remove and return the empty slot `key` held before, if any.
    fn take_previous_slot(&mut self, key: &str) -> Option<String> {
        let position = self
            .empty_slots
            .iter()
            .position(|name| self.last_occupant.get(name).is_some_and(|last| last == key))?;
        let server_name = self.empty_slots.remove(position)?;
        self.last_occupant.remove(&server_name);
        Some(server_name)
    }

    fn bind(&mut self, server_name: String, key: String, endpoint: &BackendEndpoint, delta: &mut SlotDelta) {
        delta.assigned.push((server_name.clone(), key.clone()));
        self.full_slots.insert(
            key,
            BackendSlot {
                server_name,
                endpoint: endpoint.clone(),
            },
        );
    }

    fn grow(&mut self, increment: usize) {
        for _ in 0..increment {
            self.capacity += 1;
            self.empty_slots.push_back(slot_name(self.capacity));
        }
    }

    /// Every slot in server-name order, with the endpoint bound to it if any.
    pub fn servers(&self) -> Vec<BackendServer> {
        let mut by_index: BTreeMap<usize, &BackendSlot> = BTreeMap::new();
        for slot in self.full_slots.values() {
            by_index.insert(slot_index(&slot.server_name), slot);
        }

        (1..=self.capacity)
            .map(|index| BackendServer {
                name: slot_name(index),
                endpoint: by_index.get(&index).map(|slot| slot.endpoint.clone()),
            })
            .collect()
    }
}
