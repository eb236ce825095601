//! Software painter that turns scene objects into pixels.
//!
//! Coverage is binary: a pixel is painted when its centre lies inside the
//! primitive. Each primitive is blended exactly once, so overlapping segments
//! of one translucent stroke do not darken where they meet.

use egui::{Color32, Pos2, Rect};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::element::{BrushKind, Element, SceneObject, Shape, ShapeGeometry, Stroke};

/// Converts an egui color into a straight-alpha pixel
pub fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Fills the whole target with one color
pub fn fill(target: &mut RgbaImage, color: Color32) {
    let pixel = to_rgba(color);
    for p in target.pixels_mut() {
        *p = pixel;
    }
}

/// Source-over blend of a straight-alpha color onto `dst`
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    if src[3] == 255 {
        *dst = src;
        return;
    }

    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Which pixels of a clipped region one primitive covers
struct Coverage {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    covered: Vec<bool>,
}

impl Coverage {
    /// Coverage mask for `bounds` clipped to the target; `None` if nothing is visible
    fn new(target: &RgbaImage, bounds: Rect) -> Option<Self> {
        if !bounds.is_finite() {
            return None;
        }
        let x0 = bounds.min.x.floor().max(0.0);
        let y0 = bounds.min.y.floor().max(0.0);
        let x1 = bounds.max.x.ceil().min(target.width() as f32);
        let y1 = bounds.max.y.ceil().min(target.height() as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let width = (x1 - x0) as u32;
        let height = (y1 - y0) as u32;
        Some(Self {
            x0: x0 as u32,
            y0: y0 as u32,
            width,
            height,
            covered: vec![false; (width * height) as usize],
        })
    }

    /// Marks every pixel in `region` whose centre passes `inside`
    fn mark(&mut self, region: Rect, inside: impl Fn(Pos2) -> bool) {
        let left = (region.min.x.floor() as i64).max(self.x0 as i64);
        let top = (region.min.y.floor() as i64).max(self.y0 as i64);
        let right = (region.max.x.ceil() as i64).min((self.x0 + self.width) as i64);
        let bottom = (region.max.y.ceil() as i64).min((self.y0 + self.height) as i64);

        for y in top..bottom {
            for x in left..right {
                let centre = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if inside(centre) {
                    let index = (y - self.y0 as i64) as usize * self.width as usize
                        + (x - self.x0 as i64) as usize;
                    self.covered[index] = true;
                }
            }
        }
    }

    fn mark_disc(&mut self, center: Pos2, radius: f32) {
        let region = Rect::from_center_size(center, egui::Vec2::splat(radius * 2.0));
        self.mark(region, |p| p.distance(center) <= radius);
    }

    fn mark_segment(&mut self, a: Pos2, b: Pos2, half_width: f32) {
        let region = Rect::from_two_pos(a, b).expand(half_width);
        self.mark(region, |p| distance_to_segment(p, a, b) <= half_width);
    }

    fn blend_into(&self, target: &mut RgbaImage, color: Color32) {
        let src = to_rgba(color);
        if src[3] == 0 {
            return;
        }
        for dy in 0..self.height {
            for dx in 0..self.width {
                if self.covered[(dy * self.width + dx) as usize] {
                    blend(target.get_pixel_mut(self.x0 + dx, self.y0 + dy), src);
                }
            }
        }
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Paints a polyline with round joins and caps
pub fn draw_polyline(target: &mut RgbaImage, points: &[Pos2], width: f32, color: Color32) {
    let half = width / 2.0;
    let bounds = points
        .iter()
        .fold(Rect::NOTHING, |rect, p| rect.union(Rect::from_center_size(*p, egui::Vec2::ZERO)))
        .expand(half);
    let Some(mut coverage) = Coverage::new(target, bounds) else {
        return;
    };

    match points {
        [] => return,
        [only] => coverage.mark_disc(*only, half),
        _ => {
            for w in points.windows(2) {
                coverage.mark_segment(w[0], w[1], half);
            }
        }
    }
    coverage.blend_into(target, color);
}

/// Paints separate round dots, as laid down by the spray brush
pub fn draw_dots(target: &mut RgbaImage, centres: &[Pos2], radius: f32, color: Color32) {
    let bounds = centres
        .iter()
        .fold(Rect::NOTHING, |rect, p| rect.union(Rect::from_center_size(*p, egui::Vec2::ZERO)))
        .expand(radius);
    let Some(mut coverage) = Coverage::new(target, bounds) else {
        return;
    };
    for centre in centres {
        coverage.mark_disc(*centre, radius);
    }
    coverage.blend_into(target, color);
}

pub fn fill_rect(target: &mut RgbaImage, rect: Rect, color: Color32) {
    if let Some(mut coverage) = Coverage::new(target, rect) {
        coverage.mark(rect, |p| rect.contains(p));
        coverage.blend_into(target, color);
    }
}

/// Outline centred on the rectangle's edges
pub fn stroke_rect(target: &mut RgbaImage, rect: Rect, width: f32, color: Color32) {
    let half = width / 2.0;
    let outer = rect.expand(half);
    let inner = rect.shrink(half);
    if let Some(mut coverage) = Coverage::new(target, outer) {
        coverage.mark(outer, |p| {
            outer.contains(p) && !(inner.is_positive() && inner.contains(p))
        });
        coverage.blend_into(target, color);
    }
}

pub fn fill_circle(target: &mut RgbaImage, center: Pos2, radius: f32, color: Color32) {
    let bounds = Rect::from_center_size(center, egui::Vec2::splat(radius * 2.0));
    if let Some(mut coverage) = Coverage::new(target, bounds) {
        coverage.mark_disc(center, radius);
        coverage.blend_into(target, color);
    }
}

/// Ring centred on the circle's circumference
pub fn stroke_circle(target: &mut RgbaImage, center: Pos2, radius: f32, width: f32, color: Color32) {
    let half = width / 2.0;
    let bounds = Rect::from_center_size(center, egui::Vec2::splat((radius + half) * 2.0));
    if let Some(mut coverage) = Coverage::new(target, bounds) {
        coverage.mark(bounds, |p| (p.distance(center) - radius).abs() <= half);
        coverage.blend_into(target, color);
    }
}

/// Draws `pixels` scaled into `rect`
pub fn blit(target: &mut RgbaImage, pixels: &RgbaImage, rect: Rect) {
    let width = rect.width().round();
    let height = rect.height().round();
    if width < 1.0 || height < 1.0 || !rect.is_finite() {
        return;
    }

    let (width, height) = (width as u32, height as u32);
    let x = rect.min.x.round() as i64;
    let y = rect.min.y.round() as i64;
    if (width, height) == pixels.dimensions() {
        imageops::overlay(target, pixels, x, y);
    } else {
        let scaled = imageops::resize(pixels, width, height, FilterType::Triangle);
        imageops::overlay(target, &scaled, x, y);
    }
}

fn paint_stroke(target: &mut RgbaImage, stroke: &Stroke) {
    match stroke.brush() {
        BrushKind::Pencil | BrushKind::Eraser => {
            draw_polyline(target, stroke.points(), stroke.width(), stroke.color())
        }
        BrushKind::Spray => draw_dots(target, stroke.points(), stroke.dot_radius(), stroke.color()),
    }
}

fn paint_shape(target: &mut RgbaImage, shape: &Shape) {
    match *shape.geometry() {
        ShapeGeometry::Rectangle { rect } => {
            fill_rect(target, rect, shape.fill_color());
            if shape.stroke_width() > 0.0 {
                stroke_rect(target, rect, shape.stroke_width(), shape.stroke_color());
            }
        }
        ShapeGeometry::Circle { center, radius } => {
            fill_circle(target, center, radius, shape.fill_color());
            if shape.stroke_width() > 0.0 {
                stroke_circle(target, center, radius, shape.stroke_width(), shape.stroke_color());
            }
        }
        ShapeGeometry::Line { start, end } => {
            draw_polyline(target, &[start, end], shape.stroke_width(), shape.stroke_color())
        }
    }
}

/// Paints one object over whatever the target already holds
pub fn paint_object(target: &mut RgbaImage, object: &SceneObject) {
    match object {
        SceneObject::Stroke(stroke) => paint_stroke(target, stroke),
        SceneObject::Shape(shape) => paint_shape(target, shape),
        SceneObject::Image(image) => blit(target, image.pixels(), image.rect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_blend_replaces() {
        let mut dst = Rgba([255, 255, 255, 255]);
        blend(&mut dst, Rgba([10, 20, 30, 255]));
        assert_eq!(dst, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn half_alpha_blend_mixes() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend(&mut dst, Rgba([255, 255, 255, 128]));
        assert!(dst[0] > 120 && dst[0] < 135);
        assert_eq!(dst[3], 255);
    }

    #[test]
    fn rect_fill_stays_inside() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        fill_rect(&mut img, Rect::from_min_max(Pos2::new(2.0, 2.0), Pos2::new(5.0, 5.0)), Color32::BLACK);
        assert_eq!(*img.get_pixel(3, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(6, 6), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn polyline_covers_its_path_only() {
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        draw_polyline(
            &mut img,
            &[Pos2::new(2.0, 10.0), Pos2::new(18.0, 10.0)],
            4.0,
            Color32::RED,
        );
        assert_eq!(*img.get_pixel(10, 10), to_rgba(Color32::RED));
        assert_eq!(*img.get_pixel(10, 2), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn shapes_outside_the_target_are_clipped() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        fill_circle(&mut img, Pos2::new(-50.0, -50.0), 5.0, Color32::WHITE);
        fill_rect(&mut img, Rect::from_min_max(Pos2::new(2.0, 2.0), Pos2::new(40.0, 40.0)), Color32::WHITE);
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(3, 3), Rgba([255, 255, 255, 255]));
    }
}
