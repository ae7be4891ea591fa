//! canvaskit Settings Crate
//!
//! Handles the editor configuration file and turns it into scene options.

pub mod config;

pub use config::{
    Config, EditorSettings, GestureSettings, TreeSettings, ViewportSettings, CONFIG_FILE_NAME,
};
