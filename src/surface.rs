use std::path::Path;
use std::sync::Arc;

use egui::{Color32, Pos2, Vec2};
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::command::Command;
use crate::config::CanvasConfig;
use crate::element::{Element, Image, SceneObject, Transform};
use crate::error::{ExportError, HistoryNotice, ImportError, LayerError};
use crate::history::History;
use crate::id_generator::generate_id;
use crate::input::{InputEvent, Shortcut};
use crate::layer::{Layer, LayerRegistry};
use crate::scene::Scene;
use crate::tools::{ToolController, ToolMode, ToolState};
use crate::util::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient message for the user, shown by the host as a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl From<HistoryNotice> for Notice {
    fn from(notice: HistoryNotice) -> Self {
        let level = match notice {
            HistoryNotice::NothingToUndo | HistoryNotice::NothingToRedo => NoticeLevel::Info,
            HistoryNotice::RestoreFailed => NoticeLevel::Warning,
        };
        Notice::new(level, notice.to_string())
    }
}

/// Placement that fits an image of `natural` size inside `canvas`, centred,
/// preserving its aspect ratio
pub fn fit_transform(natural: Vec2, canvas: Vec2) -> Transform {
    let scale = (canvas.x / natural.x).min(canvas.y / natural.y);
    let size = natural * scale;
    Transform::new(((canvas - size) / 2.0).to_pos2(), scale)
}

/// The drawing canvas as the host sees it.
///
/// Owns the layers (each with its scene and history), the tool controller
/// and the clock that drives debounced recording. Every mutation goes
/// through here and raises the repaint flag.
pub struct CanvasSurface {
    config: CanvasConfig,
    clock: Box<dyn Clock>,
    layers: LayerRegistry,
    tools: ToolController,
    notices: Vec<Notice>,
    repaint: bool,
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("config", &self.config)
            .field("layers", &self.layers.len())
            .field("mode", &self.tools.mode())
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    pub fn new(config: CanvasConfig, clock: Box<dyn Clock>) -> Self {
        let base = Scene::new(config.width, config.height, config.background);
        Self::from_base(config, clock, base)
    }

    /// Starts with an image already on the canvas; it is part of the first history entry
    pub fn with_initial_image(
        config: CanvasConfig,
        clock: Box<dyn Clock>,
        bytes: &[u8],
    ) -> Result<Self, ImportError> {
        let mut base = Scene::new(config.width, config.height, config.background);
        let image = fitted_image(bytes, base.size())?;
        base.insert_object(0, image);
        Ok(Self::from_base(config, clock, base))
    }

    fn from_base(config: CanvasConfig, clock: Box<dyn Clock>, base: Scene) -> Self {
        let layers = LayerRegistry::new(base, config.debounce_window());
        let tools = ToolController::new(config.tool.clone());
        info!("Canvas ready: {}x{}", config.width, config.height);
        Self {
            config,
            clock,
            layers,
            tools,
            notices: Vec::new(),
            repaint: true,
        }
    }

    /// Replaces the tool controller, e.g. with a seeded one
    pub fn with_tools(mut self, tools: ToolController) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        self.layers.layers()
    }

    pub fn active_layer(&self) -> &Layer {
        self.layers.active()
    }

    pub fn active_layer_id(&self) -> Uuid {
        self.layers.active_id()
    }

    pub fn active_scene(&self) -> &Scene {
        self.layers.active().scene()
    }

    /// History of the active layer
    pub fn history(&self) -> &History {
        self.layers.active().history()
    }

    pub fn tool_state(&self) -> &ToolState {
        self.tools.state()
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn mode(&self) -> ToolMode {
        self.tools.mode()
    }

    /// Runs a command on the active scene and schedules its history record
    fn execute(&mut self, command: Command) -> bool {
        let now = self.clock.now();
        let layer = self.layers.active_mut();
        let result = command.execute(layer.scene_mut());
        layer.observe(now);
        self.repaint = true;
        if let Err(err) = &result {
            warn!("Command failed: {}", err);
        }
        result.is_ok()
    }

    /// Records the active layer's pending change right away
    fn commit(&mut self) {
        let now = self.clock.now();
        let layer = self.layers.active_mut();
        layer.observe(now);
        if layer.flush() {
            debug!("Committed gesture on {}", layer.name());
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { location, button } => {
                if *button != egui::PointerButton::Primary || !location.is_in_canvas {
                    return;
                }
                self.tools.set_canvas_background(self.layers.background());
                let command = self.tools.pointer_down(location.position, self.layers.active().scene());
                if let Some(command) = command {
                    self.execute(command);
                }
            }
            InputEvent::PointerMove { location, held_buttons } => {
                if !self.tools.is_busy() || !held_buttons.contains(&egui::PointerButton::Primary) {
                    return;
                }
                self.pointer_move(location.position);
            }
            InputEvent::PointerUp { location, button } => {
                if *button == egui::PointerButton::Primary {
                    self.pointer_up(location.position);
                }
            }
            InputEvent::PointerLeave { last_known_location } => {
                if self.tools.is_busy() {
                    self.pointer_up(last_known_location.position);
                }
            }
            InputEvent::KeyDown { .. } => match event.shortcut() {
                Some(Shortcut::Undo) => {
                    let _ = self.undo();
                }
                Some(Shortcut::Redo) => {
                    let _ = self.redo();
                }
                Some(Shortcut::DeleteSelected) => {
                    self.delete_selected();
                }
                None => {}
            },
        }
    }

    fn pointer_move(&mut self, pos: Pos2) {
        let command = self.tools.pointer_move(pos, self.layers.active().scene());
        if let Some(command) = command {
            self.execute(command);
        }
    }

    fn pointer_up(&mut self, pos: Pos2) {
        let was_busy = self.tools.is_busy();
        let command = self.tools.pointer_up(pos, self.layers.active().scene());
        if let Some(command) = command {
            self.execute(command);
        }
        if was_busy {
            self.commit();
        }
    }

    /// Selects a tool mode; choosing a shape mode inserts a shape each time
    pub fn set_mode(&mut self, mode: ToolMode) {
        let command = self.tools.set_mode(mode, self.layers.active().scene());
        if let Some(command) = command {
            if self.execute(command) {
                self.commit();
            }
        }
        self.repaint = true;
    }

    pub fn set_color(&mut self, color: Color32) {
        self.tools.set_color(color);
    }

    pub fn set_width(&mut self, width: f32) {
        self.tools.set_width(width);
    }

    pub fn set_spray_density(&mut self, density: u32) {
        self.tools.set_spray_density(density);
    }

    fn report(&mut self, result: Result<(), HistoryNotice>) -> Result<(), HistoryNotice> {
        match result {
            Ok(()) => self.repaint = true,
            Err(notice) => self.notices.push(notice.into()),
        }
        result
    }

    pub fn undo(&mut self) -> Result<(), HistoryNotice> {
        self.tools.cancel();
        let result = self.layers.active_mut().undo();
        self.report(result)
    }

    pub fn redo(&mut self) -> Result<(), HistoryNotice> {
        self.tools.cancel();
        let result = self.layers.active_mut().redo();
        self.report(result)
    }

    pub fn add_layer(&mut self) -> Uuid {
        self.commit();
        self.tools.cancel();
        let id = self.layers.add_layer();
        self.repaint = true;
        id
    }

    pub fn switch_layer(&mut self, id: Uuid) -> Result<(), LayerError> {
        self.commit();
        self.tools.cancel();
        self.layers.switch_layer(id)?;
        self.repaint = true;
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: Uuid, visible: bool) -> Result<(), LayerError> {
        self.layers.set_visible(id, visible)?;
        self.repaint = true;
        Ok(())
    }

    pub fn rename_layer(&mut self, id: Uuid, name: &str) -> Result<(), LayerError> {
        self.layers.rename(id, name)?;
        self.repaint = true;
        Ok(())
    }

    pub fn move_layer(&mut self, id: Uuid, index: usize) -> Result<(), LayerError> {
        self.layers.move_layer(id, index)?;
        self.repaint = true;
        Ok(())
    }

    /// Canvas background, shown beneath every layer
    pub fn background(&self) -> Color32 {
        self.layers.background()
    }

    /// Changes the canvas background; recorded, debounced, in the bottom layer's history
    pub fn set_background(&mut self, color: Color32) {
        let now = self.clock.now();
        let base = self.layers.base_mut();
        match Command::SetBackground(color).execute(base.scene_mut()) {
            Ok(()) => {
                base.observe(now);
                debug!("Canvas background set to {:?}", color);
            }
            Err(err) => warn!("Could not set background: {}", err),
        }
        self.repaint = true;
    }

    /// Empties the active layer; undoable
    pub fn clear_active_layer(&mut self) {
        if self.execute(Command::ClearScene) {
            self.commit();
        }
    }

    /// Removes the selected object from the active layer, if there is one
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.active_scene().selected().map(|o| o.id()) else {
            return false;
        };
        self.execute(Command::RemoveElement { id })
    }

    /// Decodes an image and places it, fitted and centred, beneath existing objects
    pub fn import_image(&mut self, bytes: &[u8]) -> Result<usize, ImportError> {
        let image = match fitted_image(bytes, self.active_scene().size()) {
            Ok(image) => image,
            Err(err) => {
                error!("Image import failed: {}", err);
                self.notices
                    .push(Notice::new(NoticeLevel::Error, format!("Could not import image: {err}")));
                return Err(err);
            }
        };

        let id = image.id();
        info!("Imported image {} ({} bytes)", id, bytes.len());
        if self.execute(Command::InsertElement { index: 0, object: image }) {
            self.commit();
        }
        Ok(id)
    }

    /// Clipboard images take the same path as uploads
    pub fn paste_image(&mut self, bytes: &[u8]) -> Result<usize, ImportError> {
        self.import_image(bytes)
    }

    /// Composites the visible layers into PNG bytes
    pub fn to_image(&self) -> Result<Vec<u8>, ExportError> {
        let png = self.layers.to_png()?;
        info!("Exported canvas ({} bytes)", png.len());
        Ok(png)
    }

    /// Writes [`Self::to_image`] to `path`
    pub fn export_to(&mut self, path: &Path) -> Result<(), ExportError> {
        let result = self
            .to_image()
            .and_then(|png| std::fs::write(path, png).map_err(ExportError::from));
        match &result {
            Ok(()) => self.notices.push(Notice::new(
                NoticeLevel::Info,
                format!("Saved {}", path.display()),
            )),
            Err(err) => {
                error!("Export to {} failed: {}", path.display(), err);
                self.notices
                    .push(Notice::new(NoticeLevel::Error, format!("Export failed: {err}")));
            }
        }
        result
    }

    /// Drives debounced recording; returns whether any entry was appended
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let mut recorded = false;
        for layer in self.layers.layers_mut() {
            recorded |= layer.poll(now);
        }
        recorded
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Returns and clears the repaint flag
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint)
    }
}

fn fitted_image(bytes: &[u8], canvas: Vec2) -> Result<SceneObject, ImportError> {
    let mut image = Image::from_encoded(generate_id(), Arc::from(bytes), Transform::default())?;
    image.set_transform(fit_transform(image.natural_size(), canvas));
    Ok(SceneObject::Image(image))
}
