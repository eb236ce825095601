use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

mod common;
pub(crate) mod image;
pub(crate) mod shape;
pub(crate) mod stroke;

pub use self::common::{corner_under, Corner, HIT_TOLERANCE, MIN_ELEMENT_SIZE, RESIZE_HANDLE_RADIUS};
pub use self::image::{Image, ImagePayload, Transform};
pub use self::shape::{Shape, ShapeGeometry, ShapeKind};
pub use self::stroke::{BrushKind, Stroke};

use crate::error::SceneError;

/// Common trait that all scene objects implement
pub trait Element {
    /// Get the unique identifier for this element
    fn id(&self) -> usize;

    /// Get the element type as a string
    fn element_type(&self) -> &'static str;

    /// Get the bounding rectangle for this element
    fn rect(&self) -> Rect;

    /// Test if the element contains the given position
    fn hit_test(&self, pos: Pos2) -> bool;

    /// Translate the element by the given delta
    fn translate(&mut self, delta: Vec2);

    /// Resize the element to the new rectangle
    fn resize(&mut self, new_rect: Rect) -> Result<(), SceneError>;

    fn is_selected(&self) -> bool;

    fn set_selected(&mut self, selected: bool);
}

/// Every kind of drawable object a scene can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneObject {
    Stroke(Stroke),
    Shape(Shape),
    Image(Image),
}

impl SceneObject {
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            SceneObject::Stroke(stroke) => Some(stroke),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            SceneObject::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            SceneObject::Image(image) => Some(image),
            _ => None,
        }
    }

    pub(crate) fn as_stroke_mut(&mut self) -> Option<&mut Stroke> {
        match self {
            SceneObject::Stroke(stroke) => Some(stroke),
            _ => None,
        }
    }
}

impl Element for SceneObject {
    fn id(&self) -> usize {
        match self {
            SceneObject::Stroke(s) => s.id(),
            SceneObject::Shape(s) => s.id(),
            SceneObject::Image(i) => i.id(),
        }
    }

    fn element_type(&self) -> &'static str {
        match self {
            SceneObject::Stroke(s) => s.element_type(),
            SceneObject::Shape(s) => s.element_type(),
            SceneObject::Image(i) => i.element_type(),
        }
    }

    fn rect(&self) -> Rect {
        match self {
            SceneObject::Stroke(s) => s.rect(),
            SceneObject::Shape(s) => s.rect(),
            SceneObject::Image(i) => i.rect(),
        }
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match self {
            SceneObject::Stroke(s) => s.hit_test(pos),
            SceneObject::Shape(s) => s.hit_test(pos),
            SceneObject::Image(i) => i.hit_test(pos),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            SceneObject::Stroke(s) => s.translate(delta),
            SceneObject::Shape(s) => s.translate(delta),
            SceneObject::Image(i) => i.translate(delta),
        }
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), SceneError> {
        match self {
            SceneObject::Stroke(s) => s.resize(new_rect),
            SceneObject::Shape(s) => s.resize(new_rect),
            SceneObject::Image(i) => i.resize(new_rect),
        }
    }

    fn is_selected(&self) -> bool {
        match self {
            SceneObject::Stroke(s) => s.is_selected(),
            SceneObject::Shape(s) => s.is_selected(),
            SceneObject::Image(i) => i.is_selected(),
        }
    }

    fn set_selected(&mut self, selected: bool) {
        match self {
            SceneObject::Stroke(s) => s.set_selected(selected),
            SceneObject::Shape(s) => s.set_selected(selected),
            SceneObject::Image(i) => i.set_selected(selected),
        }
    }
}

/// Factory functions for creating scene objects with fresh ids
pub mod factory {
    use egui::{Color32, Pos2};

    use super::*;
    use crate::id_generator::generate_id;

    pub fn create_stroke(points: Vec<Pos2>, width: f32, color: Color32, brush: BrushKind) -> SceneObject {
        SceneObject::Stroke(Stroke::new(generate_id(), points, width, color, brush))
    }

    pub fn create_shape(
        geometry: ShapeGeometry,
        fill_color: Color32,
        stroke_color: Color32,
        stroke_width: f32,
    ) -> SceneObject {
        SceneObject::Shape(Shape::new(generate_id(), geometry, fill_color, stroke_color, stroke_width))
    }
}
