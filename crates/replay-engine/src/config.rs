//! Replay configuration.
//!
//! Stored as JSON. Every field has a default, so a partial file (or none at
//! all) is valid.

use replay_compose::BlendPrecision;
use replay_core::{ReplayError, Result};
use replay_media::clip::{DEFAULT_EXTENSIONS, INDEX_EXTENSION};
use replay_media::index::DEFAULT_FROM_END_MARGIN;
use replay_media::OpenPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for opening and playing recorded clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Folder clip names are resolved against
    pub media_folder: PathBuf,
    /// Essence extensions tried in order
    pub extensions: Vec<String>,
    /// Extension of the companion index
    pub index_extension: String,
    /// Entries kept clear of the live end on from-end seeks
    pub from_end_margin: u64,
    /// First wait while the index is empty
    pub open_initial_backoff_ms: u64,
    /// Longest single wait while the index is empty
    pub open_max_backoff_ms: u64,
    /// Give up on an empty index after this long
    pub open_timeout_ms: u64,
    /// Cross-fade weight handling for fractional speeds
    pub blend_precision: BlendPrecision,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        let policy = OpenPolicy::default();
        Self {
            media_folder: PathBuf::from("."),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            index_extension: INDEX_EXTENSION.to_string(),
            from_end_margin: DEFAULT_FROM_END_MARGIN,
            open_initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            open_max_backoff_ms: policy.max_backoff.as_millis() as u64,
            open_timeout_ms: policy.timeout.as_millis() as u64,
            blend_precision: BlendPrecision::default(),
        }
    }
}

impl ReplayConfig {
    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReplayError::NotFound(format!("Config file {} not found", path.display()))
            } else {
                ReplayError::Io(e)
            }
        })?;
        Self::from_json(&data)
    }

    /// Parse and validate JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| ReplayError::Config(format!("Invalid replay config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ReplayError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(ReplayError::Config(
                "At least one essence extension is required".to_string(),
            ));
        }
        if self.index_extension.is_empty() {
            return Err(ReplayError::Config("Index extension is empty".to_string()));
        }
        if self.open_initial_backoff_ms == 0 {
            return Err(ReplayError::Config(
                "open_initial_backoff_ms must be positive".to_string(),
            ));
        }
        if self.open_max_backoff_ms < self.open_initial_backoff_ms {
            return Err(ReplayError::Config(format!(
                "open_max_backoff_ms ({}) is below open_initial_backoff_ms ({})",
                self.open_max_backoff_ms, self.open_initial_backoff_ms
            )));
        }
        Ok(())
    }

    /// Backoff policy for opening a still-empty index.
    pub fn open_policy(&self) -> OpenPolicy {
        OpenPolicy {
            initial_backoff: Duration::from_millis(self.open_initial_backoff_ms),
            max_backoff: Duration::from_millis(self.open_max_backoff_ms),
            timeout: Duration::from_millis(self.open_timeout_ms),
        }
    }
}
