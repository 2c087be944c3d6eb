//! Editor configuration.

use crate::scale::ScaleStrategy;
use serde::{Deserialize, Serialize};

/// Z-index baseline used when no top-level child has a numeric z-index.
pub const DEFAULT_Z_BASELINE: i64 = 9998;

/// Capability flags handed to the manipulation library when a binding is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub draggable: bool,
    pub resizable: bool,
    pub scalable: bool,
    pub rotatable: bool,
    pub pinchable: bool,
    /// Snap dragged elements to sibling guidelines.
    pub snappable: bool,
    /// Snap distance in content pixels.
    pub snap_threshold: f64,
    /// Show the transform-origin handle.
    pub origin: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            draggable: true,
            resizable: true,
            scalable: true,
            rotatable: true,
            pinchable: true,
            snappable: true,
            snap_threshold: 5.0,
            origin: false,
        }
    }
}

/// Defaults applied to text elements created by the insert tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertTextStyle {
    /// Placeholder content of a freshly inserted element.
    pub placeholder: String,
    pub font_size: String,
    pub color: String,
    pub line_height: String,
}

impl Default for InsertTextStyle {
    fn default() -> Self {
        Self {
            placeholder: "Double-click to edit".to_string(),
            font_size: "16px".to_string(),
            color: "#333".to_string(),
            line_height: "1.4".to_string(),
        }
    }
}

/// Configuration for an [`Editor`](crate::Editor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Authoritative scaling strategy for this editor.
    pub strategy: ScaleStrategy,
    pub capabilities: Capabilities,
    /// Class selectors identifying the manipulation overlay's own elements.
    pub overlay_selectors: Vec<String>,
    pub insert_text: InsertTextStyle,
    /// Baseline for new z-indices when no sibling has a numeric one.
    pub z_index_baseline: i64,
    /// Cursor shown while the insert tool is armed.
    pub insert_cursor: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            strategy: ScaleStrategy::default(),
            capabilities: Capabilities::default(),
            overlay_selectors: vec![".moveable-control".to_string(), ".moveable-line".to_string()],
            insert_text: InsertTextStyle::default(),
            z_index_baseline: DEFAULT_Z_BASELINE,
            insert_cursor: "text".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Builder-style strategy override.
    pub fn with_strategy(mut self, strategy: ScaleStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
