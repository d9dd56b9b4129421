//! Source address allow-list (`whitelist-source-range`).

use async_trait::async_trait;
use ipnet::IpNet;
use serde::Serialize;

use crate::annotations::error::AnnotationError;
use crate::annotations::parser::Annotations;
use crate::annotations::{AnnotationParser, Fragment};
use crate::model::Route;

pub const WHITELIST_SOURCE_RANGE: &str = "whitelist-source-range";

/// Parser name reported with whitelist denials.
pub const WHITELIST_PARSER: &str = "whitelist";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhitelistConfig {
    pub cidrs: Vec<IpNet>,
}

impl WhitelistConfig {
    /// Space separated list, as the proxy's `src` ACL expects it.
    pub fn acl_value(&self) -> String {
        self.cidrs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct WhitelistParser {
    prefix: String,
}

impl WhitelistParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Comma separated CIDRs; a bare address becomes a host network.
    pub fn parse_whitelist(&self, route: &Route) -> Result<WhitelistConfig, AnnotationError> {
        let raw = Annotations::new(&self.prefix, route).get_string(WHITELIST_SOURCE_RANGE)?;

        let mut cidrs = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let net = entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<std::net::IpAddr>().map(IpNet::from))
                .map_err(|_| AnnotationError::denied(format!("{entry:?} is not a valid CIDR")))?;
            if !cidrs.contains(&net) {
                cidrs.push(net);
            }
        }

        if cidrs.is_empty() {
            return Err(AnnotationError::denied("the source range list is empty"));
        }
        Ok(WhitelistConfig { cidrs })
    }
}

#[async_trait]
impl AnnotationParser for WhitelistParser {
    fn name(&self) -> &'static str {
        WHITELIST_PARSER
    }

    fn is_requested(&self, route: &Route) -> bool {
        Annotations::new(&self.prefix, route).contains(WHITELIST_SOURCE_RANGE)
    }

    async fn parse(&self, route: &Route) -> Result<Fragment, AnnotationError> {
        self.parse_whitelist(route).map(Fragment::Whitelist)
    }
}
