use egui::{Color32, Pos2};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::element::{BrushKind, ShapeKind};
use crate::scene::Scene;

mod brush_tool;
mod selection_tool;
mod shape_tool;

pub use brush_tool::BrushTool;
pub use selection_tool::{SelectionState, SelectionTool};
pub use shape_tool::{default_geometry, ShapeTool};

/// Pointer samples closer than this to the previous one are dropped
pub const MIN_SAMPLE_DISTANCE: f32 = 1.0;

/// Drawing behaviors the canvas can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    Select,
    Pencil,
    Line,
    Rectangle,
    Circle,
    Spray,
    Eraser,
}

impl ToolMode {
    pub const ALL: [ToolMode; 7] = [
        ToolMode::Select,
        ToolMode::Pencil,
        ToolMode::Line,
        ToolMode::Rectangle,
        ToolMode::Circle,
        ToolMode::Spray,
        ToolMode::Eraser,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolMode::Select => "Select",
            ToolMode::Pencil => "Pencil",
            ToolMode::Line => "Line",
            ToolMode::Rectangle => "Rectangle",
            ToolMode::Circle => "Circle",
            ToolMode::Spray => "Spray",
            ToolMode::Eraser => "Eraser",
        }
    }

    /// Brush used by freehand modes
    pub fn brush(self) -> Option<BrushKind> {
        match self {
            ToolMode::Pencil => Some(BrushKind::Pencil),
            ToolMode::Spray => Some(BrushKind::Spray),
            ToolMode::Eraser => Some(BrushKind::Eraser),
            _ => None,
        }
    }

    /// Shape inserted by shape modes
    pub fn shape(self) -> Option<ShapeKind> {
        match self {
            ToolMode::Line => Some(ShapeKind::Line),
            ToolMode::Rectangle => Some(ShapeKind::Rectangle),
            ToolMode::Circle => Some(ShapeKind::Circle),
            _ => None,
        }
    }
}

/// Parameters shared by every tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolState {
    pub mode: ToolMode,
    pub color: Color32,
    /// Brush width or shape outline width in pixels
    pub width: f32,
    /// Dots laid down per spray event
    pub spray_density: u32,
    /// Spray radius as a multiple of the width
    pub spray_radius_factor: f32,
    /// Composited canvas background the eraser paints with; the active
    /// scene's background when unset
    #[serde(skip)]
    pub canvas_background: Option<Color32>,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            mode: ToolMode::Pencil,
            color: Color32::BLACK,
            width: 5.0,
            spray_density: 20,
            spray_radius_factor: 1.0,
            canvas_background: None,
        }
    }
}

/// Interface every canvas tool implements.
///
/// Tools never touch the scene directly; they read it and return the command
/// to run against it.
pub trait Tool {
    fn name(&self) -> &'static str;

    /// Called when the tool's mode is selected, including re-selection
    fn activate(&mut self, _scene: &Scene, _state: &ToolState) -> Option<Command> {
        None
    }

    /// Called before another tool takes over
    fn deactivate(&mut self) {}

    fn on_pointer_down(&mut self, pos: Pos2, scene: &Scene, state: &ToolState) -> Option<Command>;

    fn on_pointer_move(&mut self, pos: Pos2, scene: &Scene, state: &ToolState) -> Option<Command>;

    fn on_pointer_up(&mut self, pos: Pos2, scene: &Scene, state: &ToolState) -> Option<Command>;

    /// True while a gesture is in progress
    fn is_busy(&self) -> bool {
        false
    }
}

/// Enum over the concrete tools so the controller needs no boxing
#[derive(Debug)]
pub enum ToolType {
    Selection(SelectionTool),
    Brush(BrushTool),
    Shape(ShapeTool),
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Selection(tool) => tool.name(),
            Self::Brush(tool) => tool.name(),
            Self::Shape(tool) => tool.name(),
        }
    }

    fn activate(&mut self, scene: &Scene, state: &ToolState) -> Option<Command> {
        match self {
            Self::Selection(tool) => tool.activate(scene, state),
            Self::Brush(tool) => tool.activate(scene, state),
            Self::Shape(tool) => tool.activate(scene, state),
        }
    }

    fn deactivate(&mut self) {
        match self {
            Self::Selection(tool) => tool.deactivate(),
            Self::Brush(tool) => tool.deactivate(),
            Self::Shape(tool) => tool.deactivate(),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, scene: &Scene, state: &ToolState) -> Option<Command> {
        match self {
            Self::Selection(tool) => tool.on_pointer_down(pos, scene, state),
            Self::Brush(tool) => tool.on_pointer_down(pos, scene, state),
            Self::Shape(tool) => tool.on_pointer_down(pos, scene, state),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, scene: &Scene, state: &ToolState) -> Option<Command> {
        match self {
            Self::Selection(tool) => tool.on_pointer_move(pos, scene, state),
            Self::Brush(tool) => tool.on_pointer_move(pos, scene, state),
            Self::Shape(tool) => tool.on_pointer_move(pos, scene, state),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, scene: &Scene, state: &ToolState) -> Option<Command> {
        match self {
            Self::Selection(tool) => tool.on_pointer_up(pos, scene, state),
            Self::Brush(tool) => tool.on_pointer_up(pos, scene, state),
            Self::Shape(tool) => tool.on_pointer_up(pos, scene, state),
        }
    }

    fn is_busy(&self) -> bool {
        match self {
            Self::Selection(tool) => tool.is_busy(),
            Self::Brush(tool) => tool.is_busy(),
            Self::Shape(tool) => tool.is_busy(),
        }
    }
}

impl ToolType {
    pub fn as_selection_tool(&self) -> Option<&SelectionTool> {
        match self {
            Self::Selection(tool) => Some(tool),
            _ => None,
        }
    }
}

/// Owns the tool state and the tool for the current mode
#[derive(Debug)]
pub struct ToolController {
    state: ToolState,
    tool: ToolType,
    rng: StdRng,
}

impl ToolController {
    pub fn new(state: ToolState) -> Self {
        let (seed, _) = uuid::Uuid::new_v4().as_u64_pair();
        Self::with_seed(state, seed)
    }

    /// Controller whose spray pattern is reproducible
    pub fn with_seed(state: ToolState, seed: u64) -> Self {
        Self::with_rng(state, StdRng::seed_from_u64(seed))
    }

    fn with_rng(state: ToolState, mut rng: StdRng) -> Self {
        let tool = Self::build_tool(state.mode, &mut rng);
        Self { state, tool, rng }
    }

    fn build_tool(mode: ToolMode, rng: &mut StdRng) -> ToolType {
        if let Some(kind) = mode.brush() {
            ToolType::Brush(BrushTool::new(kind, StdRng::from_rng(rng)))
        } else if let Some(kind) = mode.shape() {
            ToolType::Shape(ShapeTool::new(kind))
        } else {
            ToolType::Selection(SelectionTool::new())
        }
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn mode(&self) -> ToolMode {
        self.state.mode
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn is_busy(&self) -> bool {
        self.tool.is_busy()
    }

    /// Switches mode and activates the new tool; the same mode re-activates
    pub fn set_mode(&mut self, mode: ToolMode, scene: &Scene) -> Option<Command> {
        self.tool.deactivate();
        if mode != self.state.mode {
            debug!("Tool mode {:?} -> {:?}", self.state.mode, mode);
        }
        self.state.mode = mode;
        self.tool = Self::build_tool(mode, &mut self.rng);
        self.tool.activate(scene, &self.state)
    }

    pub fn set_color(&mut self, color: Color32) {
        self.state.color = color;
    }

    pub fn set_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.width = width;
        } else {
            warn!("Ignoring invalid width {}", width);
        }
    }

    pub fn set_spray_density(&mut self, density: u32) {
        self.state.spray_density = density.max(1);
    }

    /// Background of the whole canvas, which may differ from the active layer's own
    pub fn set_canvas_background(&mut self, color: Color32) {
        self.state.canvas_background = Some(color);
    }

    /// Ends any gesture without producing a command
    pub fn cancel(&mut self) {
        self.tool.deactivate();
    }

    pub fn pointer_down(&mut self, pos: Pos2, scene: &Scene) -> Option<Command> {
        if !pos.is_finite() {
            return None;
        }
        self.tool.on_pointer_down(pos, scene, &self.state)
    }

    pub fn pointer_move(&mut self, pos: Pos2, scene: &Scene) -> Option<Command> {
        if !pos.is_finite() {
            return None;
        }
        self.tool.on_pointer_move(pos, scene, &self.state)
    }

    /// Ends the gesture; a non-finite position still releases it
    pub fn pointer_up(&mut self, pos: Pos2, scene: &Scene) -> Option<Command> {
        if !pos.is_finite() {
            self.tool.deactivate();
            return None;
        }
        self.tool.on_pointer_up(pos, scene, &self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DEFAULT_BACKGROUND;

    #[test]
    fn modes_map_to_tools() {
        let scene = Scene::new(300, 300, DEFAULT_BACKGROUND);
        let mut controller = ToolController::with_seed(ToolState::default(), 1);
        assert_eq!(controller.tool().name(), "Pencil");

        assert!(controller.set_mode(ToolMode::Select, &scene).is_none());
        assert!(controller.tool().as_selection_tool().is_some());

        let insert = controller.set_mode(ToolMode::Circle, &scene);
        assert!(matches!(insert, Some(Command::AddElement(_))));
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let scene = Scene::new(300, 300, DEFAULT_BACKGROUND);
        let mut controller = ToolController::with_seed(ToolState::default(), 1);
        assert!(controller.pointer_down(Pos2::new(f32::NAN, 3.0), &scene).is_none());
        assert!(!controller.is_busy());
    }

    #[test]
    fn non_finite_release_still_ends_the_gesture() {
        let mut scene = Scene::new(300, 300, DEFAULT_BACKGROUND);
        let mut controller = ToolController::with_seed(ToolState::default(), 1);
        if let Some(command) = controller.pointer_down(Pos2::new(10.0, 10.0), &scene) {
            command.execute(&mut scene).unwrap();
        }
        assert!(controller.is_busy());

        assert!(controller.pointer_up(Pos2::new(f32::NAN, f32::INFINITY), &scene).is_none());
        assert!(!controller.is_busy());
        assert!(controller.pointer_move(Pos2::new(50.0, 50.0), &scene).is_none());
    }

    #[test]
    fn eraser_uses_the_canvas_background_when_known() {
        let scene = Scene::new(300, 300, DEFAULT_BACKGROUND);
        let mut controller = ToolController::with_seed(ToolState::default(), 1);
        controller.set_mode(ToolMode::Eraser, &scene);
        controller.set_canvas_background(Color32::BLACK);

        let Some(Command::AddElement(object)) = controller.pointer_down(Pos2::new(5.0, 5.0), &scene) else {
            panic!("eraser should start a stroke");
        };
        assert_eq!(object.as_stroke().unwrap().color(), Color32::BLACK);
    }

    #[test]
    fn invalid_width_is_ignored() {
        let mut controller = ToolController::with_seed(ToolState::default(), 1);
        controller.set_width(-3.0);
        controller.set_width(f32::INFINITY);
        assert_eq!(controller.state().width, 5.0);
        controller.set_width(12.0);
        assert_eq!(controller.state().width, 12.0);
    }
}
