//! Annotation resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Route.annotations (prefix/key → string)
//!     → parser.rs (typed reads: string / bool / int)
//!     → AnnotationParser impls (authtls, hsts, whitelist, redirect, alias)
//!     → Fragment per parser
//!     → RouteExtensions (merged by field)
//!     → model builder
//! ```
//!
//! # Design Decisions
//! - Parsers are registered in a list and merged by fragment type, so adding
//!   a parser does not touch the extractor
//! - A denial disables one feature of one route; everything else continues
//! - Routes are independent, so they are extracted concurrently

pub mod alias;
pub mod authtls;
pub mod error;
pub mod hsts;
pub mod parser;
pub mod redirect;
pub mod whitelist;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Serialize;

use crate::config::ControllerConfig;
use crate::model::Route;
use crate::observability::metrics;
use crate::resolver::CertificateResolver;

pub use authtls::{AuthTlsParser, TlsClientAuthConfig, VerifyClient};
pub use error::AnnotationError;
pub use hsts::HstsConfig;
pub use whitelist::WhitelistConfig;

/// Output of a single parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    TlsClientAuth(TlsClientAuthConfig),
    Hsts(HstsConfig),
    Whitelist(WhitelistConfig),
    SslRedirect(bool),
    Alias(String),
}

/// Turns a route's annotations into one configuration fragment.
#[async_trait]
pub trait AnnotationParser: Send + Sync {
    /// Short feature name used in logs and denial reports.
    fn name(&self) -> &'static str;

    /// Whether the route asks for this feature at all. Parsers that are not
    /// requested are skipped without producing a denial.
    fn is_requested(&self, _route: &Route) -> bool {
        true
    }

    async fn parse(&self, route: &Route) -> Result<Fragment, AnnotationError>;
}

/// Typed features of one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteExtensions {
    pub certificate_auth: Option<TlsClientAuthConfig>,
    pub hsts: Option<HstsConfig>,
    pub whitelist: Option<WhitelistConfig>,
    pub ssl_redirect: Option<bool>,
    pub alias: Option<String>,
}

impl RouteExtensions {
    pub fn merge(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::TlsClientAuth(config) => self.certificate_auth = Some(config),
            Fragment::Hsts(config) => self.hsts = Some(config),
            Fragment::Whitelist(config) => self.whitelist = Some(config),
            Fragment::SslRedirect(redirect) => self.ssl_redirect = Some(redirect),
            Fragment::Alias(alias) => self.alias = Some(alias),
        }
    }
}

/// A feature refused for a route, kept for operator reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationDenial {
    pub route: String,
    pub parser: &'static str,
    pub reason: String,
}

/// Extraction result of one route.
#[derive(Debug, Clone)]
pub struct ExtractedRoute {
    pub route_id: String,
    pub extensions: RouteExtensions,
    pub denials: Vec<AnnotationDenial>,
}

/// Runs every registered parser over routes.
#[derive(Clone, Default)]
pub struct AnnotationExtractor {
    parsers: Vec<Arc<dyn AnnotationParser>>,
}

impl AnnotationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(mut self, parser: impl AnnotationParser + 'static) -> Self {
        self.parsers.push(Arc::new(parser));
        self
    }

    /// Extractor with every parser the controller ships.
    pub fn standard(config: &ControllerConfig, resolver: Arc<dyn CertificateResolver>) -> Self {
        let prefix = config.controller.annotation_prefix.as_str();
        let timeout = Duration::from_millis(config.controller.resolver_timeout_ms);

        Self::new()
            .with_parser(AuthTlsParser::new(prefix, resolver, timeout))
            .with_parser(hsts::HstsParser::new(prefix))
            .with_parser(whitelist::WhitelistParser::new(prefix))
            .with_parser(redirect::SslRedirectParser::new(prefix, config.controller.ssl_redirect))
            .with_parser(alias::AliasParser::new(prefix))
    }

    pub fn parser_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    pub async fn extract(&self, route: &Route) -> ExtractedRoute {
        let route_id = route.id();
        let mut extensions = RouteExtensions::default();
        let mut denials = Vec::new();

        for parser in &self.parsers {
            if !parser.is_requested(route) {
                continue;
            }
            match parser.parse(route).await {
                Ok(fragment) => extensions.merge(fragment),
                Err(err) if err.is_denied() => {
                    tracing::warn!(
                        route = %route_id,
                        parser = parser.name(),
                        error = %err,
                        "Annotation denied, feature disabled for route"
                    );
                    metrics::record_annotation_denial(parser.name());
                    denials.push(AnnotationDenial {
                        route: route_id.clone(),
                        parser: parser.name(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    tracing::debug!(
                        route = %route_id,
                        parser = parser.name(),
                        error = %err,
                        "Feature not configured"
                    );
                }
            }
        }

        ExtractedRoute {
            route_id,
            extensions,
            denials,
        }
    }

    /// Extract every route concurrently; output order follows input order.
    pub async fn extract_all(&self, routes: &[Route]) -> Vec<ExtractedRoute> {
        join_all(routes.iter().map(|route| self.extract(route))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "ingress.kubernetes.io";

    struct DenyingParser;

    #[async_trait]
    impl AnnotationParser for DenyingParser {
        fn name(&self) -> &'static str {
            "deny"
        }

        async fn parse(&self, _route: &Route) -> Result<Fragment, AnnotationError> {
            Err(AnnotationError::denied("not today"))
        }
    }

    fn route(name: &str, pairs: &[(&str, &str)]) -> Route {
        Route {
            namespace: "default".into(),
            name: name.into(),
            annotations: pairs
                .iter()
                .map(|(k, v)| (format!("{PREFIX}/{k}"), v.to_string()))
                .collect(),
            ..Route::default()
        }
    }

    #[tokio::test]
    async fn test_denial_is_isolated_to_one_parser() {
        let extractor = AnnotationExtractor::new()
            .with_parser(DenyingParser)
            .with_parser(hsts::HstsParser::new(PREFIX))
            .with_parser(redirect::SslRedirectParser::new(PREFIX, true));

        let extracted = extractor
            .extract(&route("app", &[("hsts-max-age", "60"), ("ssl-redirect", "false")]))
            .await;

        assert_eq!(extracted.route_id, "default/app");
        assert_eq!(extracted.denials.len(), 1);
        assert_eq!(extracted.denials[0].parser, "deny");
        assert_eq!(extracted.denials[0].reason, "not today");
        assert_eq!(extracted.extensions.hsts.as_ref().map(|h| h.max_age), Some(60));
        assert_eq!(extracted.extensions.ssl_redirect, Some(false));
    }

    #[tokio::test]
    async fn test_missing_annotations_are_not_denials() {
        let extractor = AnnotationExtractor::new()
            .with_parser(whitelist::WhitelistParser::new(PREFIX))
            .with_parser(alias::AliasParser::new(PREFIX));

        let extracted = extractor.extract(&route("plain", &[])).await;
        assert!(extracted.denials.is_empty());
        assert_eq!(extracted.extensions, RouteExtensions::default());
    }

    #[tokio::test]
    async fn test_extract_all_keeps_order() {
        let extractor = AnnotationExtractor::new().with_parser(alias::AliasParser::new(PREFIX));
        let routes = vec![
            route("a", &[("server-alias", "a.local")]),
            route("b", &[("server-alias", " ")]),
            route("c", &[]),
        ];

        let extracted = extractor.extract_all(&routes).await;
        let ids: Vec<_> = extracted.iter().map(|e| e.route_id.as_str()).collect();
        assert_eq!(ids, ["default/a", "default/b", "default/c"]);
        assert_eq!(extracted[0].extensions.alias.as_deref(), Some("a.local"));
        assert_eq!(extracted[1].denials.len(), 1);
    }
}
