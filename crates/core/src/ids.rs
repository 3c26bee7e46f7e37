//! Registration identifiers and sharded-path derivation.
//!
//! Registration records are stored under sharded directories derived from
//! their identifier. To keep path derivation deterministic across the
//! codebase, identifiers use a *canonical* representation: **32 lowercase
//! hexadecimal characters** (no hyphens), the same value produced by
//! `Uuid::new_v4().simple()`.
//!
//! For a canonical id `u`, data lives under `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`.
//! Two-level sharding keeps any single directory's fan-out small.
//!
//! Externally supplied identifiers (CLI arguments, API path segments) must be
//! validated with [`RegistrationId::parse`]; non-canonical values (uppercase,
//! hyphenated, wrong length, non-hex) are rejected.

use std::path::{Path, PathBuf};

/// Error type for identifier handling.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid registration id: {0}")]
    InvalidInput(String),
}

/// A registration identifier guaranteed to be in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationId(String);

impl RegistrationId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Validates an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns `IdError::InvalidInput` unless the input is exactly 32
    /// lowercase hex characters.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        if input.len() != 32 {
            return Err(IdError::InvalidInput(format!(
                "expected 32 characters, got {}",
                input.len()
            )));
        }
        if !input
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(IdError::InvalidInput(
                "expected lowercase hexadecimal characters only".into(),
            ));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns the canonical identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the sharded record directory under `parent`.
    ///
    /// Layout: `parent/<id[0..2]>/<id[2..4]>/<id>`.
    pub fn sharded_dir(&self, parent: &Path) -> PathBuf {
        parent
            .join(&self.0[0..2])
            .join(&self.0[2..4])
            .join(&self.0)
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for RegistrationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RegistrationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RegistrationId::parse(&s).map_err(serde::de::Error::custom)
    }
}
