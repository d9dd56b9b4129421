//! Reconciliation cycle.
//!
//! # Responsibilities
//! - Run extraction, model assembly and rendering for one snapshot
//! - Skip rendering when the model did not change
//! - Keep the last successfully rendered document published

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use thiserror::Error;

use crate::annotations::{AnnotationDenial, AnnotationExtractor};
use crate::backend::SlotStore;
use crate::config::ControllerConfig;
use crate::controller::builder::build_model;
use crate::controller::snapshot::ClusterSnapshot;
use crate::model::GlobalConfig;
use crate::observability::metrics;
use crate::render::{ConfigRenderer, RenderError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Rendering failed; the previous document stays in effect.
    #[error("render failed, keeping previous configuration: {0}")]
    Render(#[from] RenderError),
}

/// A model together with the document rendered from it.
#[derive(Debug)]
pub struct RenderedConfig {
    pub model: GlobalConfig,
    pub document: Vec<u8>,
}

/// Outcome of one cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// False when the model equals the previous one and nothing was rendered.
    pub changed: bool,
    pub denials: Vec<AnnotationDenial>,
    pub rendered: Arc<RenderedConfig>,
}

pub struct Reconciler {
    config: Arc<ControllerConfig>,
    extractor: AnnotationExtractor,
    slots: SlotStore,
    renderer: Arc<ConfigRenderer>,
    current: ArcSwapOption<RenderedConfig>,
}

impl Reconciler {
    pub fn new(
        config: Arc<ControllerConfig>,
        extractor: AnnotationExtractor,
        renderer: Arc<ConfigRenderer>,
    ) -> Self {
        let slots = SlotStore::new(config.proxy.backend_server_slots_increment);
        Self {
            config,
            extractor,
            slots,
            renderer,
            current: ArcSwapOption::empty(),
        }
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    /// Last successfully rendered configuration.
    pub fn current(&self) -> Option<Arc<RenderedConfig>> {
        self.current.load_full()
    }

    pub async fn reconcile(&self, snapshot: &ClusterSnapshot) -> Result<CycleReport, ReconcileError> {
        let extracted = self.extractor.extract_all(&snapshot.routes).await;
        let denials: Vec<AnnotationDenial> = extracted
            .iter()
            .flat_map(|e| e.denials.iter().cloned())
            .collect();

        let model = build_model(&self.config, snapshot, &extracted, &self.slots);

        if let Some(previous) = self.current() {
            if previous.model == model {
                tracing::debug!("Configuration unchanged, render skipped");
                metrics::record_render("unchanged");
                return Ok(CycleReport {
                    changed: false,
                    denials,
                    rendered: previous,
                });
            }
        }

        let document = match self.renderer.render(&model) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(
                    template = %self.renderer.name(),
                    error = %e,
                    "Render failed, previous configuration kept"
                );
                metrics::record_render("failure");
                return Err(e.into());
            }
        };

        tracing::info!(
            hosts = model.hosts.len(),
            backends = model.backends.len(),
            bytes = document.len(),
            denials = denials.len(),
            "Configuration rendered"
        );
        metrics::record_render("success");

        let rendered = Arc::new(RenderedConfig { model, document });
        self.current.store(Some(Arc::clone(&rendered)));
        Ok(CycleReport {
            changed: true,
            denials,
            rendered,
        })
    }
}
