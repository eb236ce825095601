use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::Element;
use crate::element::common;
use crate::error::SceneError;

/// How a stroke's points are laid down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    /// Connected polyline
    Pencil,
    /// Loose dots scattered around the pointer
    Spray,
    /// Polyline painted in the background color
    Eraser,
}

/// Dot radius of a spray mark relative to the brush width
pub const SPRAY_DOT_FACTOR: f32 = 0.1;
const MIN_SPRAY_DOT_RADIUS: f32 = 0.5;

/// Freehand stroke made of sampled pointer positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: usize,
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    brush: BrushKind,
    #[serde(skip)]
    selected: bool,
}

impl Stroke {
    pub fn new(id: usize, points: Vec<Pos2>, width: f32, color: Color32, brush: BrushKind) -> Self {
        Self {
            id,
            points,
            color,
            width,
            brush,
            selected: false,
        }
    }

    /// Get the points that make up this stroke
    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn brush(&self) -> BrushKind {
        self.brush
    }

    /// Radius of a single spray mark
    pub fn dot_radius(&self) -> f32 {
        (self.width * SPRAY_DOT_FACTOR).max(MIN_SPRAY_DOT_RADIUS)
    }

    pub(crate) fn extend(&mut self, points: &[Pos2]) {
        self.points.extend_from_slice(points);
    }

    fn padding(&self) -> f32 {
        match self.brush {
            BrushKind::Spray => self.dot_radius(),
            BrushKind::Pencil | BrushKind::Eraser => self.width / 2.0,
        }
    }
}

impl Element for Stroke {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "stroke"
    }

    fn rect(&self) -> Rect {
        common::calculate_bounds(&self.points, self.padding())
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match self.brush {
            // Spray marks are too sparse to pick individually
            BrushKind::Spray => self.rect().contains(pos),
            BrushKind::Pencil | BrushKind::Eraser => {
                let reach = (self.width / 2.0).max(common::HIT_TOLERANCE);
                match self.points.as_slice() {
                    [] => false,
                    [only] => only.distance(pos) <= reach,
                    points => points
                        .windows(2)
                        .any(|w| common::distance_to_line_segment(pos, w[0], w[1]) <= reach),
                }
            }
        }
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), SceneError> {
        common::validate_rect(&new_rect)?;

        let old_rect = self.rect();
        if !old_rect.is_positive() {
            return Err(SceneError::InvalidGeometry("Cannot resize empty stroke".to_string()));
        }

        let scale_x = new_rect.width() / old_rect.width();
        let scale_y = new_rect.height() / old_rect.height();

        for point in &mut self.points {
            *point = common::remap_point(*point, old_rect, new_rect);
        }

        // Scale thickness proportionally
        self.width *= (scale_x + scale_y) / 2.0;
        Ok(())
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
