//! HTTP Strict Transport Security (`hsts*` annotations).
//!
//! Every knob is optional and falls back to its default on malformed input;
//! this parser never denies.

use async_trait::async_trait;
use serde::Serialize;

use crate::annotations::error::AnnotationError;
use crate::annotations::parser::Annotations;
use crate::annotations::{AnnotationParser, Fragment};
use crate::model::Route;

pub const HSTS: &str = "hsts";
pub const HSTS_MAX_AGE: &str = "hsts-max-age";
pub const HSTS_INCLUDE_SUBDOMAINS: &str = "hsts-include-subdomains";
pub const HSTS_PRELOAD: &str = "hsts-preload";

const KEYS: [&str; 4] = [HSTS, HSTS_MAX_AGE, HSTS_INCLUDE_SUBDOMAINS, HSTS_PRELOAD];

/// Six months, in seconds.
pub const DEFAULT_MAX_AGE: u64 = 15_768_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HstsConfig {
    pub enable: bool,
    pub max_age: u64,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            max_age: DEFAULT_MAX_AGE,
            include_subdomains: false,
            preload: false,
        }
    }
}

impl HstsConfig {
    /// `Strict-Transport-Security` header value.
    pub fn header_value(&self) -> String {
        let mut value = format!("max-age={}", self.max_age);
        if self.include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        value
    }
}

pub struct HstsParser {
    prefix: String,
}

impl HstsParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn parse_hsts(&self, route: &Route) -> HstsConfig {
        let ann = Annotations::new(&self.prefix, route);
        let defaults = HstsConfig::default();

        HstsConfig {
            enable: ann.get_bool(HSTS).unwrap_or(defaults.enable),
            max_age: ann
                .get_int(HSTS_MAX_AGE)
                .ok()
                .and_then(|age| u64::try_from(age).ok())
                .unwrap_or(defaults.max_age),
            include_subdomains: ann
                .get_bool(HSTS_INCLUDE_SUBDOMAINS)
                .unwrap_or(defaults.include_subdomains),
            preload: ann.get_bool(HSTS_PRELOAD).unwrap_or(defaults.preload),
        }
    }
}

#[async_trait]
impl AnnotationParser for HstsParser {
    fn name(&self) -> &'static str {
        "hsts"
    }

    fn is_requested(&self, route: &Route) -> bool {
        Annotations::new(&self.prefix, route).contains_any(&KEYS)
    }

    async fn parse(&self, route: &Route) -> Result<Fragment, AnnotationError> {
        Ok(Fragment::Hsts(self.parse_hsts(route)))
    }
}
