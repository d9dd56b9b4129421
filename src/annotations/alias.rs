//! Additional host name (`server-alias`).

use async_trait::async_trait;

use crate::annotations::error::AnnotationError;
use crate::annotations::parser::Annotations;
use crate::annotations::{AnnotationParser, Fragment};
use crate::model::Route;

pub const SERVER_ALIAS: &str = "server-alias";

pub struct AliasParser {
    prefix: String,
}

impl AliasParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn parse_alias(&self, route: &Route) -> Result<String, AnnotationError> {
        let alias = Annotations::new(&self.prefix, route).get_string(SERVER_ALIAS)?.trim();
        if alias.is_empty() {
            return Err(AnnotationError::denied("server alias is empty"));
        }
        Ok(alias.to_string())
    }
}

#[async_trait]
impl AnnotationParser for AliasParser {
    fn name(&self) -> &'static str {
        "server-alias"
    }

    fn is_requested(&self, route: &Route) -> bool {
        Annotations::new(&self.prefix, route).contains(SERVER_ALIAS)
    }

    async fn parse(&self, route: &Route) -> Result<Fragment, AnnotationError> {
        self.parse_alias(route).map(Fragment::Alias)
    }
}
