use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Longest slug or sub-key accepted, matching the usual option-name column width.
pub const MAX_NAME_LEN: usize = 191;

/// Top-level key under which one whole record is persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(raw: impl Into<String>) -> Result<Self, ModelError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ModelError::Validation("slug must not be empty".into()));
        }
        if raw.len() > MAX_NAME_LEN {
            return Err(ModelError::Validation(format!("slug longer than {MAX_NAME_LEN} bytes")));
        }
        if let Some(bad) = raw.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
            return Err(ModelError::Validation(format!("slug contains illegal character {bad:?}")));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str { &self.0 }
}

impl TryFrom<String> for Slug {
    type Error = ModelError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Slug::new(value) }
}

impl TryFrom<&str> for Slug {
    type Error = ModelError;
    fn try_from(value: &str) -> Result<Self, Self::Error> { Slug::new(value) }
}

impl From<Slug> for String {
    fn from(s: Slug) -> Self { s.0 }
}

/// Sub-keys are addressed as `slug[key]` in submitted forms, so brackets are reserved.
pub fn validate_sub_key(key: &str) -> Result<(), ModelError> {
    if key.is_empty() {
        return Err(ModelError::Validation("sub-key must not be empty".into()));
    }
    if key.len() > MAX_NAME_LEN {
        return Err(ModelError::Validation(format!("sub-key longer than {MAX_NAME_LEN} bytes")));
    }
    if key.chars().any(|c| c.is_control() || c == '[' || c == ']') {
        return Err(ModelError::Validation(format!("sub-key {key:?} contains illegal characters")));
    }
    Ok(())
}
