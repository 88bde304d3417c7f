// ABOUTME: Validated names for sealed host types.
// ABOUTME: Allows namespaced identifiers like "ui.View" used as factory keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeNameError {
    #[error("sealed type name cannot be empty")]
    Empty,

    #[error("sealed type name exceeds maximum length of 255 characters")]
    TooLong,

    #[error("sealed type name segment cannot be empty")]
    EmptySegment,

    #[error("invalid character in sealed type name: '{0}'")]
    InvalidChar(char),
}

/// The name of a sealed host type, as registered with the factory.
///
/// Dot-separated segments are allowed so host namespaces ("ui.View") can be
/// used verbatim as factory keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(value: &str) -> Result<Self, TypeNameError> {
        if value.is_empty() {
            return Err(TypeNameError::Empty);
        }

        if value.len() > 255 {
            return Err(TypeNameError::TooLong);
        }

        for segment in value.split('.') {
            if segment.is_empty() {
                return Err(TypeNameError::EmptySegment);
            }
            for c in segment.chars() {
                if !c.is_ascii_alphanumeric() && c != '_' {
                    return Err(TypeNameError::InvalidChar(c));
                }
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TypeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TypeName::new(&raw).map_err(de::Error::custom)
    }
}
