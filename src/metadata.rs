//! Run metadata published alongside the network table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Metadata describing one parse run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMetadata {
    pub system_version: Option<String>,
    pub num_network_blocks: usize,
    pub last_update: DateTime<Utc>,
}

impl RunMetadata {
    /// Create metadata stamped with the current time.
    pub fn now(system_version: Option<&str>, num_network_blocks: usize) -> Self {
        Self {
            system_version: system_version.map(str::to_string),
            num_network_blocks,
            last_update: Utc::now(),
        }
    }

    /// Load metadata from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save metadata to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
