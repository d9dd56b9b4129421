//! Typed access to a route's annotations.
//!
//! Readers report [`AnnotationError::MissingAnnotation`] and
//! [`AnnotationError::MalformedAnnotation`]; deciding on a default is left
//! to each parser.

use std::collections::BTreeMap;

use crate::annotations::error::AnnotationError;
use crate::model::Route;

/// A route's annotations seen through the controller's key prefix.
#[derive(Debug, Clone, Copy)]
pub struct Annotations<'a> {
    prefix: &'a str,
    values: &'a BTreeMap<String, String>,
}

impl<'a> Annotations<'a> {
    pub fn new(prefix: &'a str, route: &'a Route) -> Self {
        Self {
            prefix,
            values: &route.annotations,
        }
    }

    /// Full key for `name`, e.g. `ingress.kubernetes.io/auth-tls-secret`.
    pub fn key(&self, name: &str) -> String {
        format!("{}/{}", self.prefix, name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&self.key(name))
    }

    pub fn contains_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.contains(name))
    }

    pub fn get_string(&self, name: &str) -> Result<&'a str, AnnotationError> {
        let key = self.key(name);
        self.values
            .get(&key)
            .map(String::as_str)
            .ok_or(AnnotationError::MissingAnnotation(key))
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, AnnotationError> {
        let value = self.get_string(name)?;
        parse_bool(value).ok_or_else(|| self.malformed(name, value))
    }

    pub fn get_int(&self, name: &str) -> Result<i64, AnnotationError> {
        let value = self.get_string(name)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| self.malformed(name, value))
    }

    fn malformed(&self, name: &str, value: &str) -> AnnotationError {
        AnnotationError::MalformedAnnotation {
            key: self.key(name),
            value: value.to_string(),
        }
    }
}

/// Boolean spellings accepted by Kubernetes tooling.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
