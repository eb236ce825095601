use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;
use log::debug;
use serde::{Deserialize, Serialize};

use super::Element;
use crate::element::common;
use crate::error::{ImportError, SceneError};

/// Placement of an image relative to its natural pixel size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// Top-left corner in canvas pixels
    pub position: Pos2,
    /// Scale factor per axis (1.0 = natural size)
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Pos2::ZERO,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn new(position: Pos2, scale: f32) -> Self {
        Self {
            position,
            scale: Vec2::splat(scale),
        }
    }
}

/// Bitmap placed on the canvas.
///
/// Only the id and placement go into snapshot text. The encoded bytes and
/// decoded pixels travel next to it as a shared [`ImagePayload`].
#[derive(Clone, Serialize, Deserialize)]
pub struct Image {
    id: usize,
    #[serde(skip, default = "empty_source")]
    source_data: Arc<[u8]>,
    #[serde(skip)]
    pixels: Arc<RgbaImage>,
    transform: Transform,
    #[serde(skip)]
    selected: bool,
}

fn empty_source() -> Arc<[u8]> {
    Arc::from(Vec::new())
}

/// Encoded bytes of an image with their decoded pixels, shared between the
/// scene and every snapshot that contains the image
#[derive(Clone)]
pub struct ImagePayload {
    source_data: Arc<[u8]>,
    pixels: Arc<RgbaImage>,
}

impl ImagePayload {
    pub fn source_data(&self) -> &[u8] {
        &self.source_data
    }
}

impl PartialEq for ImagePayload {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source_data, &other.source_data) || self.source_data == other.source_data
    }
}

impl Eq for ImagePayload {}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("data_len", &self.source_data.len())
            .field("dimensions", &self.pixels.dimensions())
            .finish()
    }
}

// Pixels are elided; they are derived from the source bytes
impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("data_len", &self.source_data.len())
            .field("natural_size", &self.natural_size())
            .field("transform", &self.transform)
            .field("selected", &self.selected)
            .finish()
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.transform == other.transform
            && self.source_data == other.source_data
    }
}

impl Image {
    /// Decodes `source_data` (PNG, JPEG, ...) into a new image element
    pub fn from_encoded(
        id: usize,
        source_data: Arc<[u8]>,
        transform: Transform,
    ) -> Result<Self, ImportError> {
        let decoded = image::load_from_memory(&source_data)?.to_rgba8();
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(ImportError::Empty);
        }
        debug!("Decoded image {}: {}x{}", id, decoded.width(), decoded.height());

        Ok(Self {
            id,
            source_data,
            pixels: Arc::new(decoded),
            transform,
            selected: false,
        })
    }

    pub fn source_data(&self) -> &[u8] {
        &self.source_data
    }

    pub(crate) fn payload(&self) -> ImagePayload {
        ImagePayload {
            source_data: Arc::clone(&self.source_data),
            pixels: Arc::clone(&self.pixels),
        }
    }

    /// Re-attaches the bytes and pixels a snapshot carried for this image
    pub(crate) fn attach_payload(&mut self, payload: ImagePayload) {
        self.source_data = payload.source_data;
        self.pixels = payload.pixels;
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Decoded size in pixels before scaling
    pub fn natural_size(&self) -> Vec2 {
        Vec2::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    /// Displayed size on the canvas
    pub fn size(&self) -> Vec2 {
        self.natural_size() * self.transform.scale
    }
}

impl Element for Image {
    fn id(&self) -> usize {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "image"
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(self.transform.position, self.size())
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    fn translate(&mut self, delta: Vec2) {
        self.transform.position += delta;
    }

    fn resize(&mut self, new_rect: Rect) -> Result<(), SceneError> {
        common::validate_rect(&new_rect)?;

        self.transform.position = new_rect.min;
        self.transform.scale = new_rect.size() / self.natural_size();
        Ok(())
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
