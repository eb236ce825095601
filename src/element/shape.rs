use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::Element;
use crate::element::common;
use crate::error::SceneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
}

/// Placement of a shape on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeGeometry {
    Rectangle { rect: Rect },
    Circle { center: Pos2, radius: f32 },
    Line { start: Pos2, end: Pos2 },
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Rectangle { .. } => ShapeKind::Rectangle,
            ShapeGeometry::Circle { .. } => ShapeKind::Circle,
            ShapeGeometry::Line { .. } => ShapeKind::Line,
        }
    }
}

/// Geometric primitive with separate fill and outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    id: usize,
    geometry: ShapeGeometry,
    fill_color: Color32,
    stroke_color: Color32,
    stroke_width: f32,
    #[serde(skip)]
    selected: bool,
}

impl Shape {
    pub fn new(
        id: usize,
        geometry: ShapeGeometry,
        fill_color: Color32,
        stroke_color: Color32,
        stroke_width: f32,
    ) -> Self {
        Self {
            id,
            geometry,
            fill_color,
            stroke_color,
            stroke_width,
            selected: false,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn fill_color(&self) -> Color32 {
        self.fill_color
    }

    pub fn stroke_color(&self) -> Color32 {
        self.stroke_color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }
}

impl Element for Shape {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> &'static str {
        match self.kind() {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Line => "line",
        }
    }

    fn rect(&self) -> Rect {
        match self.geometry {
            ShapeGeometry::Rectangle { rect } => rect,
            ShapeGeometry::Circle { center, radius } => {
                Rect::from_center_size(center, Vec2::splat(radius * 2.0))
            }
            ShapeGeometry::Line { start, end } => {
                Rect::from_two_pos(start, end).expand(self.stroke_width / 2.0)
            }
        }
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        let half = self.stroke_width / 2.0;
        match self.geometry {
            ShapeGeometry::Rectangle { rect } => rect.expand(half).contains(pos),
            ShapeGeometry::Circle { center, radius } => center.distance(pos) <= radius + half,
            ShapeGeometry::Line { start, end } => {
                common::distance_to_line_segment(pos, start, end) <= half.max(common::HIT_TOLERANCE)
            }
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match &mut self.geometry {
            ShapeGeometry::Rectangle { rect } => *rect = rect.translate(delta),
            ShapeGeometry::Circle { center, .. } => *center += delta,
            ShapeGeometry::Line { start, end } => {
                *start += delta;
                *end += delta;
            }
        }
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), SceneError> {
        let old_rect = self.rect();
        match &mut self.geometry {
            ShapeGeometry::Rectangle { rect } => {
                common::validate_rect(&new_rect)?;
                *rect = new_rect;
            }
            ShapeGeometry::Circle { center, radius } => {
                common::validate_rect(&new_rect)?;
                *center = new_rect.center();
                *radius = new_rect.width().min(new_rect.height()) / 2.0;
            }
            ShapeGeometry::Line { start, end } => {
                // A line may be flat along one axis, but not along both
                if new_rect.width().max(new_rect.height()) < common::MIN_ELEMENT_SIZE {
                    return Err(SceneError::InvalidGeometry(format!(
                        "Line too short (min: {})",
                        common::MIN_ELEMENT_SIZE
                    )));
                }
                *start = common::remap_point(*start, old_rect, new_rect);
                *end = common::remap_point(*end, old_rect, new_rect);
            }
        }
        Ok(())
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
