//! Secret references (`namespace/name` or bare `name`).

use std::fmt;

use thiserror::Error;

const MAX_NAME_LEN: usize = 253;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretRefError {
    #[error("an empty string is not a valid secret name")]
    Empty,

    #[error("invalid format (namespace/name) found in {0:?}")]
    Format(String),

    #[error("{segment:?} in {input:?} is not a valid resource name")]
    InvalidName { input: String, segment: String },
}

/// A parsed reference to a secret holding trust material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretRef {
    /// `None` for bare names; resolvers apply their default namespace.
    pub namespace: Option<String>,
    pub name: String,
}

impl SecretRef {
    pub fn parse(input: &str) -> Result<Self, SecretRefError> {
        if input.is_empty() {
            return Err(SecretRefError::Empty);
        }

        let mut parts = input.split('/');
        let (namespace, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => (None, name),
            (Some(namespace), Some(name), None) => (Some(namespace), name),
            _ => return Err(SecretRefError::Format(input.to_string())),
        };

        for segment in namespace.iter().chain(std::iter::once(&name)) {
            if !is_resource_name(segment) {
                return Err(SecretRefError::InvalidName {
                    input: input.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        })
    }

    pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(default)
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Lowercase RFC 1123 subdomain: alphanumerics, `-` and `.`, starting and
/// ending with an alphanumeric.
fn is_resource_name(segment: &str) -> bool {
    let valid_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    !segment.is_empty()
        && segment.len() <= MAX_NAME_LEN
        && segment.chars().all(|c| valid_char(c) || c == '-' || c == '.')
        && segment.starts_with(valid_char)
        && segment.ends_with(valid_char)
}
