//! Assembly of the per-cycle [`GlobalConfig`].
//!
//! # Responsibilities
//! - Merge route rules into host and location records
//! - Apply each route's extensions to the records it owns
//! - Reconcile the slot table of every referenced backend
//!
//! # Design Decisions
//! - Routes are visited in `namespace/name` order; the first route naming a
//!   host owns its host-level features
//! - A path already claimed on a host is skipped, never overwritten
//! - Rules without a host feed the default server
//! - A route whose whitelist was denied gets locations that reject every
//!   request, so a broken allow-list never opens a path to all sources

use std::collections::{BTreeMap, HashSet};

use crate::annotations::whitelist::WHITELIST_PARSER;
use crate::annotations::ExtractedRoute;
use crate::backend::SlotStore;
use crate::config::ControllerConfig;
use crate::controller::snapshot::ClusterSnapshot;
use crate::model::{GlobalConfig, HostRecord, LocationRecord, Route};

const DEFAULT_SERVER_NAME: &str = "_default";

/// Build the model for `snapshot`. `extracted` holds one entry per route,
/// in route order.
pub fn build_model(
    config: &ControllerConfig,
    snapshot: &ClusterSnapshot,
    extracted: &[ExtractedRoute],
    slots: &SlotStore,
) -> GlobalConfig {
    let mut model = GlobalConfig::new(config.proxy.clone());
    let mut hosts: BTreeMap<String, HostRecord> = BTreeMap::new();
    let mut default_server: Option<HostRecord> = None;

    let mut order: Vec<(&Route, &ExtractedRoute)> = snapshot.routes.iter().zip(extracted).collect();
    order.sort_by_key(|(route, _)| (route.namespace.as_str(), route.name.as_str()));

    for (route, extracted) in order {
        let ext = &extracted.extensions;
        let whitelist = ext.whitelist.as_ref().map(|w| w.acl_value());
        let whitelist_denial = extracted
            .denials
            .iter()
            .find(|d| d.parser == WHITELIST_PARSER)
            .map(|d| d.reason.clone());

        for rule in &route.rules {
            let host = if rule.host.is_empty() {
                default_server.get_or_insert_with(|| {
                    let mut host = HostRecord::new(DEFAULT_SERVER_NAME);
                    host.is_default_server = true;
                    host
                })
            } else {
                hosts.entry(rule.host.clone()).or_insert_with(|| {
                    let mut host = HostRecord::new(rule.host.as_str());
                    host.alias = ext.alias.clone();
                    host.ssl_redirect = ext.ssl_redirect.unwrap_or(config.controller.ssl_redirect);
                    host.hsts_header = ext
                        .hsts
                        .as_ref()
                        .filter(|hsts| hsts.enable)
                        .map(|hsts| hsts.header_value());
                    host.certificate_auth = ext.certificate_auth.clone();
                    host.is_ca_cert = host.certificate_auth.is_some();
                    host
                })
            };

            for path in &rule.paths {
                if host.location(&path.path).is_some() {
                    tracing::warn!(
                        route = %extracted.route_id,
                        host = %host.hostname,
                        path = %path.path,
                        "Path already claimed by another route, skipped"
                    );
                    continue;
                }
                let mut location = LocationRecord::new(path.path.as_str(), path.backend.as_str());
                location.whitelist = whitelist.clone();
                location.denied = whitelist_denial.clone();
                host.locations.push(location);
            }
        }
    }

    if let Some(backend) = &config.controller.default_backend {
        let host = default_server.get_or_insert_with(|| {
            let mut host = HostRecord::new(DEFAULT_SERVER_NAME);
            host.is_default_server = true;
            host
        });
        if host.root_location().is_none() {
            host.locations.push(LocationRecord::new("/", backend.as_str()));
        }
    }

    model.hosts = hosts.into_values().collect();
    for host in &mut model.hosts {
        host.sort_locations();
    }
    model.sort_hosts();
    if let Some(host) = default_server.as_mut() {
        host.sort_locations();
    }
    model.default_server = default_server;

    let referenced: HashSet<String> = model
        .hosts
        .iter()
        .chain(model.default_server.iter())
        .flat_map(|h| h.locations.iter().map(|l| l.backend.clone()))
        .collect();
    for backend in &referenced {
        let view = slots.reconcile(backend, snapshot.endpoints_of(backend));
        model.backends.insert(backend.clone(), view);
    }
    slots.retain(&referenced);

    model
}
