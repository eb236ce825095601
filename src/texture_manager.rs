use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use thiserror::Error;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Converts decoded pixels into an egui image
pub fn color_image(pixels: &RgbaImage) -> Result<ColorImage, TextureGenerationError> {
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureGenerationError::InvalidDimensions { width, height });
    }
    Ok(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        pixels.as_raw(),
    ))
}

/// GPU textures for image objects, cached by object id
pub struct TextureManager {
    texture_cache: HashMap<usize, TextureHandle>,
    /// Frame in which each texture was last drawn
    last_used: HashMap<usize, u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Returns the texture for `element_id`, uploading `pixels` on a miss
    pub fn get_or_create_texture(
        &mut self,
        element_id: usize,
        pixels: &RgbaImage,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError> {
        if let Some(handle) = self.texture_cache.get(&element_id) {
            self.last_used.insert(element_id, self.current_frame);
            return Ok(handle.id());
        }

        let image = color_image(pixels)?;
        let handle = ctx.load_texture(format!("image_{element_id}"), image, TextureOptions::LINEAR);
        let id = handle.id();
        self.texture_cache.insert(element_id, handle);
        self.last_used.insert(element_id, self.current_frame);
        self.prune_cache_if_needed();
        Ok(id)
    }

    pub fn invalidate_element(&mut self, element_id: usize) {
        self.texture_cache.remove(&element_id);
        self.last_used.remove(&element_id);
    }

    /// Drops least recently drawn textures beyond the cache limit
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(usize, u64)> = self.last_used.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() - self.max_cache_size;
        for (id, _) in entries.into_iter().take(to_remove) {
            self.texture_cache.remove(&id);
            self.last_used.remove(&id);
        }
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    fn contains(&self, element_id: usize) -> bool {
        self.texture_cache.contains_key(&element_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels() -> RgbaImage {
        RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        let first = manager.get_or_create_texture(1, &pixels(), &ctx).unwrap();
        let second = manager.get_or_create_texture(1, &pixels(), &ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);

        manager.invalidate_element(1);
        assert_eq!(manager.cache_size(), 0);
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);

        manager.get_or_create_texture(1, &pixels(), &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(2, &pixels(), &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(3, &pixels(), &ctx).unwrap();

        assert_eq!(manager.cache_size(), 2);
        assert!(!manager.contains(1));
        assert!(manager.contains(2));
        assert!(manager.contains(3));
    }

    #[test]
    fn empty_pixels_are_rejected() {
        let result = color_image(&RgbaImage::new(0, 3));
        assert!(matches!(
            result,
            Err(TextureGenerationError::InvalidDimensions { width: 0, height: 3 })
        ));
    }
}
