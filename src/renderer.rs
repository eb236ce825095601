use eframe::egui::{self, Color32, Painter, Pos2, Rect, Stroke as EguiStroke, Vec2};

use crate::element::{
    BrushKind, Corner, Element, Image, SceneObject, Shape, ShapeGeometry, Stroke, RESIZE_HANDLE_RADIUS,
};
use crate::layer::Layer;
use crate::texture_manager::TextureManager;

const SELECTION_COLOR: Color32 = Color32::from_rgb(30, 144, 255);
const MAX_CACHED_TEXTURES: usize = 64;

/// Paints the canvas layers with egui every frame.
///
/// This is the interactive view; exports go through the software rasterizer.
pub struct Renderer {
    textures: TextureManager,
    ctx: egui::Context,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("cached_textures", &self.textures.cache_size())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(ctx: &egui::Context) -> Self {
        Self {
            textures: TextureManager::new(MAX_CACHED_TEXTURES),
            ctx: ctx.clone(),
        }
    }

    /// Draws `layers` bottom first into `canvas_rect`, plus the active layer's selection
    pub fn render(&mut self, painter: &Painter, canvas_rect: Rect, layers: &[Layer]) {
        self.textures.begin_frame();
        let painter = painter.with_clip_rect(canvas_rect);
        let offset = canvas_rect.min.to_vec2();

        let background = layers
            .first()
            .map(|layer| layer.scene().background())
            .unwrap_or(Color32::WHITE);
        painter.rect_filled(canvas_rect, 0.0, background);

        for layer in layers.iter().filter(|layer| layer.is_visible()) {
            for object in layer.scene().objects() {
                self.draw_object(&painter, object, offset);
            }
        }

        let selected = layers
            .iter()
            .find(|layer| layer.is_active())
            .and_then(|layer| layer.scene().selected());
        if let Some(object) = selected {
            draw_selection(&painter, object.rect().translate(offset));
        }
    }

    fn draw_object(&mut self, painter: &Painter, object: &SceneObject, offset: Vec2) {
        match object {
            SceneObject::Stroke(stroke) => draw_stroke(painter, stroke, offset),
            SceneObject::Shape(shape) => draw_shape(painter, shape, offset),
            SceneObject::Image(image) => self.draw_image(painter, image, offset),
        }
    }

    fn draw_image(&mut self, painter: &Painter, image: &Image, offset: Vec2) {
        match self
            .textures
            .get_or_create_texture(image.id(), image.pixels(), &self.ctx)
        {
            Ok(texture_id) => {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(texture_id, image.rect().translate(offset), uv, Color32::WHITE);
            }
            Err(err) => log::warn!("Cannot draw image {}: {}", image.id(), err),
        }
    }
}

fn draw_stroke(painter: &Painter, stroke: &Stroke, offset: Vec2) {
    let points: Vec<Pos2> = stroke.points().iter().map(|p| *p + offset).collect();
    match stroke.brush() {
        BrushKind::Spray => {
            for dot in &points {
                painter.circle_filled(*dot, stroke.dot_radius(), stroke.color());
            }
        }
        BrushKind::Pencil | BrushKind::Eraser => {
            let radius = stroke.width() / 2.0;
            // Round caps; egui lines end flat
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                painter.circle_filled(*first, radius, stroke.color());
                painter.circle_filled(*last, radius, stroke.color());
            }
            if points.len() > 1 {
                painter.add(egui::Shape::line(points, EguiStroke::new(stroke.width(), stroke.color())));
            }
        }
    }
}

fn draw_shape(painter: &Painter, shape: &Shape, offset: Vec2) {
    let outline = EguiStroke::new(shape.stroke_width(), shape.stroke_color());
    match *shape.geometry() {
        ShapeGeometry::Rectangle { rect } => {
            let rect = rect.translate(offset);
            painter.rect_filled(rect, 0.0, shape.fill_color());
            painter.rect_stroke(rect, 0.0, outline);
        }
        ShapeGeometry::Circle { center, radius } => {
            painter.circle(center + offset, radius, shape.fill_color(), outline);
        }
        ShapeGeometry::Line { start, end } => {
            painter.line_segment([start + offset, end + offset], outline);
        }
    }
}

fn draw_selection(painter: &Painter, rect: Rect) {
    painter.rect_stroke(rect, 0.0, EguiStroke::new(1.5, SELECTION_COLOR));
    for corner in Corner::ALL {
        painter.circle(
            corner.position(rect),
            RESIZE_HANDLE_RADIUS / 2.0,
            Color32::WHITE,
            EguiStroke::new(1.5, SELECTION_COLOR),
        );
    }
}
