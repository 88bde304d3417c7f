// ABOUTME: Validated trait definition names.
// ABOUTME: Ensures names are identifier-shaped so diagnostics and logs stay unambiguous.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraitNameError {
    #[error("trait name cannot be empty")]
    Empty,

    #[error("trait name exceeds maximum length of 128 characters")]
    TooLong,

    #[error("trait name must start with a letter or underscore, got '{0}'")]
    InvalidStart(char),

    #[error("invalid character in trait name: '{0}'")]
    InvalidChar(char),
}

/// The declared name of a trait definition.
///
/// Names identify traits in diagnostics and error messages; uniqueness is
/// provided by `TraitId`, not by the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraitName(String);

impl TraitName {
    pub fn new(value: &str) -> Result<Self, TraitNameError> {
        if value.len() > 128 {
            return Err(TraitNameError::TooLong);
        }

        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(TraitNameError::Empty);
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(TraitNameError::InvalidStart(first));
        }

        for c in chars {
            if !c.is_ascii_alphanumeric() && c != '_' {
                return Err(TraitNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TraitName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TraitName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TraitName::new(&raw).map_err(de::Error::custom)
    }
}
