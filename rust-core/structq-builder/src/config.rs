// SPDX-License-Identifier: PMPL-1.0-or-later
//! Builder configuration.
//!
//! Defaults are fully permissive, matching the behaviour of the free
//! constructor functions:
//! - shape_mode: permissive (unclassifiable shapes are dropped)
//! - label_mode: permissive (unknown constraint labels fall back to range)

use serde::{Deserialize, Serialize};

use crate::error::{BuilderError, Result};

/// Environment variable that switches every mode to strict.
pub const STRICT_ENV_VAR: &str = "STRUCTQ_STRICT";

/// How a fallback situation is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Apply the silent default and keep building.
    #[default]
    Permissive,
    /// Report the situation as a [`BuilderError`].
    Strict,
}

impl ClassificationMode {
    pub fn is_strict(self) -> bool {
        self == ClassificationMode::Strict
    }
}

/// Configuration for a [`crate::QueryBuilder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Handling of geospatial shapes that match no shape kind.
    pub shape_mode: ClassificationMode,
    /// Handling of unknown constraint labels and untaggable value terms.
    pub label_mode: ClassificationMode,
}

impl BuilderConfig {
    /// Both modes strict.
    pub fn strict() -> Self {
        Self {
            shape_mode: ClassificationMode::Strict,
            label_mode: ClassificationMode::Strict,
        }
    }

    /// Parse a JSON configuration; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BuilderError::InvalidConfig(e.to_string()))
    }

    /// Defaults, switched to strict when `STRUCTQ_STRICT` is `1` or `true`.
    pub fn from_env() -> Self {
        Self::default().with_env_override(std::env::var(STRICT_ENV_VAR).ok().as_deref())
    }

    /// Apply a raw `STRUCTQ_STRICT` value. Anything other than `1`/`true` is ignored.
    pub fn with_env_override(self, strict: Option<&str>) -> Self {
        match strict.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "1" || s == "true" => Self::strict(),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_permissive() {
        let config = BuilderConfig::default();
        assert_eq!(config.shape_mode, ClassificationMode::Permissive);
        assert_eq!(config.label_mode, ClassificationMode::Permissive);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BuilderConfig::from_json(r#"{"shape_mode": "strict"}"#).unwrap();
        assert!(config.shape_mode.is_strict());
        assert!(!config.label_mode.is_strict());
    }

    #[test]
    fn test_bad_json_is_invalid_config() {
        let err = BuilderConfig::from_json(r#"{"shape_mode": "loud"}"#).unwrap_err();
        assert!(matches!(err, BuilderError::InvalidConfig(_)));
    }

    #[test]
    fn test_env_override() {
        let base = BuilderConfig::default();
        assert_eq!(base.with_env_override(Some("1")), BuilderConfig::strict());
        assert_eq!(base.with_env_override(Some("TRUE")), BuilderConfig::strict());
        assert_eq!(base.with_env_override(Some("0")), base);
        assert_eq!(base.with_env_override(None), base);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = BuilderConfig::strict();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(BuilderConfig::from_json(&json).unwrap(), config);
    }
}
