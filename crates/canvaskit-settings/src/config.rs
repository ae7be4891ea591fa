//! Configuration for the canvaskit editor
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; the default location is inside the platform config
//! directory.
//!
//! Configuration is organized into logical sections:
//! - Editor switches (editing, advanced types, pan and zoom)
//! - Gesture tunables (snapping, rotation throttle)
//! - Element tree naming
//! - Initial viewport size

use canvaskit_core::{Error, EventBusConfig, Result};
use canvaskit_scene::{GestureSettings as SceneGestureSettings, Rect, SceneOptions, ViewOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Editor switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Allow gestures and batch selection
    pub enable_editing: bool,
    /// Offer element types hidden from the basic palette
    #[serde(default)]
    pub show_advanced_types: bool,
    /// Pan and zoom the canvas with the pointer
    #[serde(default)]
    pub pan_zoom: bool,
    /// Let panning go past the viewport bounds
    #[serde(default)]
    pub infinite_pan: bool,
    /// Keep the selection across structural edits
    #[serde(default)]
    pub preserve_selection: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            enable_editing: true,
            show_advanced_types: false,
            pan_zoom: false,
            infinite_pan: false,
            preserve_selection: false,
        }
    }
}

/// Gesture tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureSettings {
    /// Snap dragged boxes to other elements
    pub snap_enabled: bool,
    /// Snap distance in pixels
    pub snap_threshold: f64,
    /// Rotation step in degrees
    pub rotate_throttle: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        let defaults = SceneGestureSettings::default();
        Self {
            snap_enabled: defaults.snap_enabled,
            snap_threshold: defaults.snap_threshold,
            rotate_throttle: defaults.rotate_throttle,
        }
    }
}

/// Element tree settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSettings {
    /// How many generated names are probed before falling back to a timestamp
    pub name_probe_limit: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            name_probe_limit: canvaskit_scene::tree::DEFAULT_NAME_PROBE_LIMIT,
        }
    }
}

/// Initial viewport size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

fn default_inline_edit_types() -> Vec<String> {
    vec!["text".to_string()]
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub gestures: GestureSettings,
    #[serde(default)]
    pub tree: TreeSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
    /// Element types supporting inline edit mode
    #[serde(default = "default_inline_edit_types")]
    pub inline_edit_types: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorSettings::default(),
            gestures: GestureSettings::default(),
            tree: TreeSettings::default(),
            viewport: ViewportSettings::default(),
            inline_edit_types: default_inline_edit_types(),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, `None` when the platform has no config
    /// directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("canvaskit").join(CONFIG_FILE_NAME))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read config file: {}", e)))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid JSON config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config at the default location, falling back to defaults
    /// when there is no file yet.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.gestures.snap_threshold > 0.0 && self.gestures.snap_threshold.is_finite()) {
            return Err(Error::other("Snap threshold must be > 0"));
        }

        if !(self.gestures.rotate_throttle > 0.0 && self.gestures.rotate_throttle.is_finite()) {
            return Err(Error::other("Rotate throttle must be > 0"));
        }

        if self.tree.name_probe_limit == 0 {
            return Err(Error::other("Name probe limit must be > 0"));
        }

        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(Error::other("Viewport dimensions must be > 0"));
        }

        Ok(())
    }

    /// Scene options described by this config
    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            enable_editing: self.editor.enable_editing,
            preserve_selection: self.editor.preserve_selection,
            root_bounds: Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height),
            gestures: SceneGestureSettings {
                snap_enabled: self.gestures.snap_enabled,
                snap_threshold: self.gestures.snap_threshold,
                rotate_throttle: self.gestures.rotate_throttle,
            },
            name_probe_limit: self.tree.name_probe_limit,
            inline_edit_types: self.inline_edit_types.clone(),
            view: ViewOptions {
                show_advanced_types: self.editor.show_advanced_types,
                pan_zoom: self.editor.pan_zoom,
                infinite_pan: self.editor.infinite_pan,
            },
            event_bus: EventBusConfig::default(),
        }
    }
}
