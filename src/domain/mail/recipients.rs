//! Recipient list as accepted by the JSON API

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Recipients in either of the accepted request shapes
///
/// A single string may hold several addresses separated by `;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    Single(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Normalize to a flat list of trimmed, non-empty addresses
    pub fn normalize(&self) -> Vec<String> {
        match self {
            Self::Single(value) => value
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Self::Many(values) => values
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Normalize, rejecting an empty result
    pub fn into_list(self) -> Result<Vec<String>, DomainError> {
        let list = self.normalize();

        if list.is_empty() {
            return Err(DomainError::validation("At least one recipient is required"));
        }

        Ok(list)
    }
}

impl From<&str> for Recipients {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for Recipients {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}
