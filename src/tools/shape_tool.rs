use egui::{Color32, Pos2, Rect, Vec2};
use log::debug;

use crate::command::Command;
use crate::element::{factory, Element, ShapeGeometry, ShapeKind};
use crate::scene::Scene;
use crate::tools::{Tool, ToolState};

/// Top-left corner of a freshly inserted shape
const DEFAULT_ORIGIN: Pos2 = Pos2::new(100.0, 100.0);
/// Side length of a freshly inserted shape's bounding box
const DEFAULT_EXTENT: f32 = 100.0;

/// Geometry a shape of `kind` gets when inserted
pub fn default_geometry(kind: ShapeKind) -> ShapeGeometry {
    let bounds = Rect::from_min_size(DEFAULT_ORIGIN, Vec2::splat(DEFAULT_EXTENT));
    match kind {
        ShapeKind::Rectangle => ShapeGeometry::Rectangle { rect: bounds },
        ShapeKind::Circle => ShapeGeometry::Circle {
            center: bounds.center(),
            radius: DEFAULT_EXTENT / 2.0,
        },
        ShapeKind::Line => ShapeGeometry::Line {
            start: bounds.min,
            end: bounds.max,
        },
    }
}

/// Inserts a default-placed shape each time its mode is chosen.
///
/// Shapes are repositioned afterwards with the select tool; pointer input in
/// a shape mode is ignored.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    kind: ShapeKind,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Line => "Line",
        }
    }

    fn activate(&mut self, _scene: &Scene, state: &ToolState) -> Option<Command> {
        let fill = match self.kind {
            ShapeKind::Line => Color32::TRANSPARENT,
            ShapeKind::Rectangle | ShapeKind::Circle => state.color,
        };
        let mut shape = factory::create_shape(default_geometry(self.kind), fill, state.color, state.width);
        shape.set_selected(true);
        debug!("Inserting {} {}", shape.element_type(), shape.id());
        Some(Command::AddElement(shape))
    }

    fn on_pointer_down(&mut self, _pos: Pos2, _scene: &Scene, _state: &ToolState) -> Option<Command> {
        None
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _scene: &Scene, _state: &ToolState) -> Option<Command> {
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _scene: &Scene, _state: &ToolState) -> Option<Command> {
        None
    }
}
