use std::time::Duration;

use egui::Color32;
use image::RgbaImage;
use log::{debug, info};
use uuid::Uuid;

use crate::error::{ExportError, HistoryNotice, LayerError};
use crate::history::History;
use crate::raster;
use crate::scene::{self, Scene};

/// Named drawing surface that owns its own scene and history
#[derive(Debug)]
pub struct Layer {
    id: Uuid,
    name: String,
    visible: bool,
    active: bool,
    scene: Scene,
    history: History,
}

impl Layer {
    /// Creates a layer whose history starts at the scene's current state
    pub fn new(name: &str, mut scene: Scene, window: Duration) -> Self {
        let id = Uuid::new_v4();
        let history = History::seeded(id, window, &mut scene);
        Self {
            id,
            name: name.to_string(),
            visible: true,
            active: false,
            scene,
            history,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Feeds the scene's pending events into the history
    pub fn observe(&mut self, now: Duration) -> bool {
        self.history.observe(&mut self.scene, now)
    }

    /// Records the scene if its debounce deadline has passed
    pub fn poll(&mut self, now: Duration) -> bool {
        self.history.poll(now, &mut self.scene)
    }

    pub fn flush(&mut self) -> bool {
        self.history.flush(&mut self.scene)
    }

    pub fn undo(&mut self) -> Result<(), HistoryNotice> {
        self.history.undo(&mut self.scene)
    }

    pub fn redo(&mut self) -> Result<(), HistoryNotice> {
        self.history.redo(&mut self.scene)
    }
}

/// Ordered set of layers, bottom first, with exactly one active layer
#[derive(Debug)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    active: usize,
    window: Duration,
}

impl LayerRegistry {
    /// Creates a registry holding a single active layer built on `base`
    pub fn new(base: Scene, window: Duration) -> Self {
        let mut first = Layer::new("Layer 1", base, window);
        first.active = true;
        Self {
            layers: vec![first],
            active: 0,
            window,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    fn index_of(&self, id: Uuid) -> Result<usize, LayerError> {
        self.layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or(LayerError::NotFound(id))
    }

    pub fn active(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.active]
    }

    pub fn active_id(&self) -> Uuid {
        self.active().id
    }

    fn base(&self) -> &Scene {
        &self.layers[0].scene
    }

    /// Bottom layer, whose background is the canvas background
    pub fn base_mut(&mut self) -> &mut Layer {
        &mut self.layers[0]
    }

    /// Background the composite is painted on
    pub fn background(&self) -> Color32 {
        self.base().background()
    }

    fn activate(&mut self, index: usize) {
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.active = i == index;
        }
        self.active = index;
    }

    /// Appends an empty layer on top and makes it active
    pub fn add_layer(&mut self) -> Uuid {
        let name = format!("Layer {}", self.layers.len() + 1);
        let base = self.base();
        let scene = Scene::new(base.width(), base.height(), base.background());
        let layer = Layer::new(&name, scene, self.window);
        let id = layer.id;

        self.layers.push(layer);
        self.activate(self.layers.len() - 1);
        info!("Added {} ({})", name, id);
        id
    }

    /// Makes `id` the active layer; contents are untouched
    pub fn switch_layer(&mut self, id: Uuid) -> Result<(), LayerError> {
        let index = self.index_of(id)?;
        self.activate(index);
        debug!("Switched to layer {}", self.layers[index].name);
        Ok(())
    }

    pub fn set_visible(&mut self, id: Uuid, visible: bool) -> Result<(), LayerError> {
        let index = self.index_of(id)?;
        self.layers[index].visible = visible;
        Ok(())
    }

    pub fn rename(&mut self, id: Uuid, name: &str) -> Result<(), LayerError> {
        let index = self.index_of(id)?;
        self.layers[index].name = name.to_string();
        Ok(())
    }

    /// Moves a layer to `index` in paint order (clamped to the top)
    pub fn move_layer(&mut self, id: Uuid, index: usize) -> Result<(), LayerError> {
        let from = self.index_of(id)?;
        let active_id = self.active_id();
        let layer = self.layers.remove(from);
        let to = index.min(self.layers.len());
        self.layers.insert(to, layer);
        self.active = self.index_of(active_id)?;
        debug!("Moved layer {} from {} to {}", id, from, to);
        Ok(())
    }

    /// Composites the visible layers over the bottom layer's background
    pub fn rasterize(&self) -> RgbaImage {
        let base = self.base();
        let mut target = RgbaImage::new(base.width(), base.height());
        raster::fill(&mut target, base.background());
        for layer in self.layers.iter().filter(|layer| layer.visible) {
            layer.scene.paint_objects(&mut target);
        }
        target
    }

    pub fn to_png(&self) -> Result<Vec<u8>, ExportError> {
        scene::encode_png(&self.rasterize())
    }
}
