#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod history;
pub mod id_generator;
pub mod input;
pub mod layer;
pub mod panels;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod surface;
pub mod texture_manager;
pub mod tools;
pub mod util;

pub use app::SketchApp;
pub use command::Command;
pub use config::CanvasConfig;
pub use element::{Element, SceneObject};
pub use history::History;
pub use input::{InputEvent, InputLocation};
pub use layer::{Layer, LayerRegistry};
pub use renderer::Renderer;
pub use scene::{Scene, Snapshot};
pub use surface::{CanvasSurface, Notice, NoticeLevel};
pub use tools::{Tool, ToolController, ToolMode, ToolState};
pub use util::{Clock, ManualClock, SystemClock};
