use crate::error::{BoardSyncError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration for the drag engine and its file backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Pointer travel, in device-independent pixels, before a press
    /// becomes a drag
    pub activation_distance: f64,
    /// Buffered drag events per subscriber before the slowest one lags
    pub event_capacity: usize,
    /// Root directory of the JSON file backend
    pub data_dir: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            activation_distance: 8.0,
            event_capacity: 64,
            data_dir: PathBuf::from(".boardsync"),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    /// BOARDSYNC_ACTIVATION_DISTANCE, BOARDSYNC_EVENT_CAPACITY, BOARDSYNC_DATA_DIR
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("BOARDSYNC_ACTIVATION_DISTANCE") {
            config.activation_distance = raw.trim().parse().map_err(|_| {
                BoardSyncError::ConfigError(format!(
                    "BOARDSYNC_ACTIVATION_DISTANCE must be a number, got '{raw}'"
                ))
            })?;
        }

        if let Some(raw) = lookup("BOARDSYNC_EVENT_CAPACITY") {
            config.event_capacity = raw.trim().parse().map_err(|_| {
                BoardSyncError::ConfigError(format!(
                    "BOARDSYNC_EVENT_CAPACITY must be a positive integer, got '{raw}'"
                ))
            })?;
        }

        if let Some(raw) = lookup("BOARDSYNC_DATA_DIR") {
            config.data_dir = PathBuf::from(raw);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.activation_distance.is_finite() || self.activation_distance < 0.0 {
            return Err(BoardSyncError::ConfigError(format!(
                "activation_distance must be a non-negative number, got {}",
                self.activation_distance
            )));
        }
        if self.event_capacity == 0 {
            return Err(BoardSyncError::ConfigError(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
