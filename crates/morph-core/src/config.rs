//! Scene description read by front-ends.

use crate::background::BackgroundConfig;
use crate::host::HostConfig;
use crate::morpher::MorpherConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to assemble a host, a background field and a morpher.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub host: HostConfig,
    pub morpher: MorpherConfig,
    /// `None` disables the background field.
    pub background: Option<BackgroundConfig>,
}

impl SceneConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid scene configuration")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read scene configuration '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    #[test]
    fn partial_json_uses_defaults() {
        let config = SceneConfig::from_json_str(
            r#"{
                "host": { "width": 800, "height": 600 },
                "morpher": {
                    "sources": ["bulb.obj", "spanner.obj", "plane.obj"],
                    "color": { "r": 1.0, "g": 0.5, "b": 0.0 }
                },
                "background": { "quantity": 5 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.host.width, 800.0);
        assert_eq!(config.host.fps, 60);
        assert_eq!(config.morpher.sources.len(), 3);
        assert_eq!(config.morpher.scale, 400.0);
        assert_eq!(config.morpher.color, Color::new(1.0, 0.5, 0.0, 1.0));
        assert_eq!(config.background.unwrap().size, 50.0);
    }

    #[test]
    fn colors_accept_hex() {
        let config = SceneConfig::from_json_str(
            r##"{
                "morpher": { "color": 16777215 },
                "background": { "color": "#000000" }
            }"##,
        )
        .unwrap();

        assert_eq!(config.morpher.color, Color::WHITE);
        assert_eq!(config.background.unwrap().color, Color::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(SceneConfig::from_json_str("{ not json").is_err());
    }
}
