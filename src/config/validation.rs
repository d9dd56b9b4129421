//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (slot increment > 0, resolver timeout > 0)
//! - Reject settings the renderer would turn into a broken document
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ControllerConfig;
use crate::render::size::size_suffix_to_int64;

/// A single semantic problem in the controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("proxy.backend_server_slots_increment must be at least 1")]
    ZeroSlotIncrement,

    #[error("controller.resolver_timeout_ms must be greater than 0")]
    ZeroResolverTimeout,

    #[error("controller.annotation_prefix must not be empty")]
    EmptyAnnotationPrefix,

    #[error("controller.annotation_prefix {0:?} must not end with '/'")]
    TrailingSlashPrefix(String),

    #[error("proxy.proxy_body_size {0:?} is not a valid size")]
    InvalidBodySize(String),

    #[error("controller.default_backend must not be empty when set")]
    EmptyDefaultBackend,
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.proxy.backend_server_slots_increment == 0 {
        errors.push(ValidationError::ZeroSlotIncrement);
    }
    if config.controller.resolver_timeout_ms == 0 {
        errors.push(ValidationError::ZeroResolverTimeout);
    }

    let prefix = &config.controller.annotation_prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::EmptyAnnotationPrefix);
    } else if prefix.ends_with('/') {
        errors.push(ValidationError::TrailingSlashPrefix(prefix.clone()));
    }

    if size_suffix_to_int64(&config.proxy.proxy_body_size).is_err() {
        errors.push(ValidationError::InvalidBodySize(config.proxy.proxy_body_size.clone()));
    }

    if matches!(config.controller.default_backend.as_deref(), Some("")) {
        errors.push(ValidationError::EmptyDefaultBackend);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ControllerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ControllerConfig::default();
        config.proxy.backend_server_slots_increment = 0;
        config.controller.annotation_prefix = "ingress.kubernetes.io/".into();
        config.proxy.proxy_body_size = "10q".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroSlotIncrement));
        assert!(errors.contains(&ValidationError::InvalidBodySize("10q".into())));
    }
}
