//! HTTP to HTTPS redirect (`ssl-redirect`).

use async_trait::async_trait;

use crate::annotations::error::AnnotationError;
use crate::annotations::parser::Annotations;
use crate::annotations::{AnnotationParser, Fragment};
use crate::model::Route;

pub const SSL_REDIRECT: &str = "ssl-redirect";

pub struct SslRedirectParser {
    prefix: String,
    default: bool,
}

impl SslRedirectParser {
    pub fn new(prefix: impl Into<String>, default: bool) -> Self {
        Self {
            prefix: prefix.into(),
            default,
        }
    }

    pub fn parse_redirect(&self, route: &Route) -> bool {
        Annotations::new(&self.prefix, route)
            .get_bool(SSL_REDIRECT)
            .unwrap_or(self.default)
    }
}

#[async_trait]
impl AnnotationParser for SslRedirectParser {
    fn name(&self) -> &'static str {
        "ssl-redirect"
    }

    async fn parse(&self, route: &Route) -> Result<Fragment, AnnotationError> {
        Ok(Fragment::SslRedirect(self.parse_redirect(route)))
    }
}
