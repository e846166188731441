//! Engine configuration.

use serde::{Deserialize, Serialize};

/// How a mutation is written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Tombstone the old tip, then append an Edit superseding it.
    ///
    /// Two appends, not atomic. Only used for `TipOnly` types, and only
    /// when the actor owns the resource; other writes fall back to a single
    /// versioned Edit.
    #[default]
    TombstoneThenEdit,
    /// A single Edit carrying the next version.
    VersionedEdit,
}

/// Configuration for the Engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How mutations are published.
    pub write_mode: WriteMode,
    /// Whether the reader verifies every signature and drops failures.
    pub verify_signatures: bool,
    /// Whether to validate entries on ingest.
    pub validate_on_ingest: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::default(),
            verify_signatures: false,
            validate_on_ingest: true,
        }
    }
}

impl EngineConfig {
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn with_signature_verification(mut self, enabled: bool) -> Self {
        self.verify_signatures = enabled;
        self
    }

    pub fn with_validate_on_ingest(mut self, enabled: bool) -> Self {
        self.validate_on_ingest = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.write_mode, WriteMode::TombstoneThenEdit);
        assert!(!config.verify_signatures);
        assert!(config.validate_on_ingest);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"write_mode":"versioned_edit"}"#).unwrap();
        assert_eq!(
            config,
            EngineConfig::default().with_write_mode(WriteMode::VersionedEdit)
        );
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_signature_verification(true)
            .with_validate_on_ingest(false);
        assert!(config.verify_signatures);
        assert!(!config.validate_on_ingest);
    }
}
