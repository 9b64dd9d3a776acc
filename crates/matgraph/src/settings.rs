// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph and evaluator settings, stored as RON.

use crate::catalog::MATERIAL_OUTPUT;
use crate::texture::DEFAULT_TEXTURE_ID;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "matgraph.ron";

/// Whether `connect` may close a cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePolicy {
    /// Accept; evaluation breaks cycles on its own
    #[default]
    Allow,
    /// Refuse links that make the graph cyclic
    Reject,
}

/// Evaluation placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorSettings {
    /// Texture sampled when a node names none
    pub placeholder_texture_id: String,
    /// Scalar produced by texture samples that cannot yield a texture
    pub texture_scalar_placeholder: f32,
    /// Color shown for a channel while its pending value is being resolved
    pub pending_placeholder_color: [f32; 3],
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            placeholder_texture_id: DEFAULT_TEXTURE_ID.to_string(),
            texture_scalar_placeholder: 0.5,
            pending_placeholder_color: [1.0, 1.0, 1.0],
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Format version
    pub version: u32,
    /// Definition key of the protected root node
    pub root_definition: String,
    /// Cycle handling on connect
    pub cycle_policy: CyclePolicy,
    /// Evaluator placeholders
    pub evaluation: EvaluatorSettings,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            root_definition: MATERIAL_OUTPUT.to_string(),
            cycle_policy: CyclePolicy::default(),
            evaluation: EvaluatorSettings::default(),
        }
    }
}

/// Settings load/save error
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

impl GraphSettings {
    /// Parse from RON
    pub fn from_ron(s: &str) -> Result<Self, SettingsError> {
        let settings: GraphSettings = ron::from_str(s)?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
