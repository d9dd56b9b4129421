//! Backend endpoint abstraction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One live upstream target of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct BackendEndpoint {
    pub address: String,
    pub port: u16,
}

impl BackendEndpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Identity used to key slot bindings (`address:port`).
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BackendEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}
