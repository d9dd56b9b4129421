//! Annotation error taxonomy.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while turning annotations into configuration fragments.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// The annotation is not set on the route.
    #[error("annotation {0} is missing")]
    MissingAnnotation(String),

    /// The annotation is set but does not parse as the expected type.
    #[error("annotation {key} has malformed value {value:?}")]
    MalformedAnnotation { key: String, value: String },

    /// Input is present but invalid or unresolvable; the feature is disabled
    /// for the route.
    #[error("{reason}")]
    ConfigurationDenied {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl AnnotationError {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::ConfigurationDenied {
            reason: reason.into(),
            source: None,
        }
    }

    /// Denial caused by another error, kept as `source()`.
    pub fn denied_by<E>(context: &str, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigurationDenied {
            reason: format!("{context}: {cause}"),
            source: Some(Box::new(cause)),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::ConfigurationDenied { .. })
    }
}
