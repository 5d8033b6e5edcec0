//! Save payload: edit history, seed and observer position

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::voxel::edit::Override;

/// Everything needed to reproduce a world: terrain comes back from the seed,
/// edits are replayed in recorded order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub overrides: Vec<Override>,
    pub seed: f64,
    pub observer_position: Vec3,
}

impl SavePayload {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to LZ4-compressed JSON
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        Ok(lz4_flex::compress_prepend_size(&json))
    }

    /// Deserialize from LZ4-compressed JSON
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let json = lz4_flex::decompress_size_prepended(data)
            .map_err(|e| Error::Compression(format!("LZ4 decompression failed: {}", e)))?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Write to `path`; a `.lz4` extension selects the compressed form
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = if is_compressed(path) {
            self.to_bytes()?
        } else {
            self.to_json()?.into_bytes()
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        log::info!("Saved {} overrides to {}", self.overrides.len(), path.display());
        Ok(())
    }

    /// Read a payload written by `save`
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let payload = if is_compressed(path) {
            Self::from_bytes(&bytes)?
        } else {
            serde_json::from_slice(&bytes)?
        };
        log::info!("Loaded {} overrides from {}", payload.overrides.len(), path.display());
        Ok(payload)
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("lz4"))
}
