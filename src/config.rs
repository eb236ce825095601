use std::path::PathBuf;
use std::time::Duration;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::tools::ToolState;

/// Canvas settings, persisted by the host between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color32,
    /// Quiescence before an edit is recorded in history
    pub debounce_ms: u64,
    /// Tool mode and parameters the canvas starts with
    pub tool: ToolState,
    /// Where "Export PNG" writes the composited image
    pub export_path: PathBuf,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color32::WHITE,
            debounce_ms: 300,
            tool: ToolState::default(),
            export_path: PathBuf::from("drawing.png"),
        }
    }
}

impl CanvasConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
