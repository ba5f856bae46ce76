//! Department data structure.

use serde::{Deserialize, Serialize};

/// An academic unit with one notice-listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Department {
    /// Department display name, unique within the registry
    pub name: String,

    /// URL of the department's notice listing page
    pub url: String,
}

impl Department {
    /// Create a new department entry.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
