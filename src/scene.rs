use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;

use egui::{Color32, Pos2, Rect, Vec2};
use image::{ImageFormat, RgbaImage};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::element::{Element, ImagePayload, SceneObject};
use crate::error::{ExportError, SceneError, SnapshotError};
use crate::event::{EventQueue, SceneEvent};
use crate::id_generator;
use crate::raster;

/// Background a scene returns to when cleared
pub const DEFAULT_BACKGROUND: Color32 = Color32::WHITE;

/// Immutable serialized copy of a scene.
///
/// Objects, background and dimensions are JSON text. Image bytes stay out of
/// the text: each image's payload is held by id and shared with the scene,
/// so snapshots of an unchanged image cost no extra copy of it. The content
/// is opaque to everything except [`Scene::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    json: String,
    images: BTreeMap<usize, ImagePayload>,
}

impl Snapshot {
    /// Wraps text produced elsewhere; it is only validated on restore
    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            json: json.into(),
            images: BTreeMap::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.json
    }

    /// Length of the JSON text; shared image payloads are not counted
    pub fn len(&self) -> usize {
        self.json.len()
    }

    pub fn is_empty(&self) -> bool {
        self.json.is_empty()
    }

    /// Encoded bytes carried for image `id`
    pub fn image_data(&self, id: usize) -> Option<&[u8]> {
        self.images.get(&id).map(|payload| payload.source_data())
    }
}

#[derive(Serialize)]
struct SceneDataRef<'a> {
    width: u32,
    height: u32,
    background: Color32,
    objects: &'a [SceneObject],
}

#[derive(Deserialize)]
struct SceneData {
    width: u32,
    height: u32,
    background: Color32,
    objects: Vec<SceneObject>,
}

/// Ordered collection of drawable objects for one layer.
///
/// Paint order is insertion order: later objects draw over earlier ones.
/// Every edit is reported through the scene's event queue; selection changes
/// are reported too but are not edits.
#[derive(Debug)]
pub struct Scene {
    width: u32,
    height: u32,
    background: Color32,
    objects: Vec<SceneObject>,
    events: EventQueue,
}

impl Scene {
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            background,
            objects: Vec::new(),
            events: EventQueue::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canvas size in pixels
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    fn get_mut(&mut self, id: usize) -> Result<&mut SceneObject, SceneError> {
        self.objects
            .iter_mut()
            .find(|o| o.id() == id)
            .ok_or(SceneError::NotFound(id))
    }

    /// Appends an object on top of the paint order and returns its id
    pub fn add_object(&mut self, object: SceneObject) -> usize {
        let index = self.objects.len();
        self.insert_object(index, object)
    }

    /// Inserts an object at `index` (clamped to the end); 0 is the bottom
    pub fn insert_object(&mut self, index: usize, object: SceneObject) -> usize {
        let id = object.id();
        if object.is_selected() {
            self.clear_selection_flags();
        }
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        debug!("Added {} {} at z {}", self.objects[index].element_type(), id, index);
        self.events.emit(SceneEvent::ObjectAdded { id });
        id
    }

    /// Removes an object; an unknown id is a no-op
    pub fn remove_object(&mut self, id: usize) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id() == id)?;
        let removed = self.objects.remove(index);
        self.events.emit(SceneEvent::ObjectRemoved { id });
        Some(removed)
    }

    /// Drops every object and resets the background
    pub fn clear(&mut self) {
        self.objects.clear();
        self.background = DEFAULT_BACKGROUND;
        self.events.emit(SceneEvent::Cleared);
    }

    pub fn set_background(&mut self, color: Color32) {
        self.background = color;
        self.events.emit(SceneEvent::BackgroundChanged);
    }

    pub fn translate_object(&mut self, id: usize, delta: Vec2) -> Result<(), SceneError> {
        self.get_mut(id)?.translate(delta);
        self.events.emit(SceneEvent::ObjectModified { id });
        Ok(())
    }

    pub fn resize_object(&mut self, id: usize, rect: Rect) -> Result<(), SceneError> {
        self.get_mut(id)?.resize(rect)?;
        self.events.emit(SceneEvent::ObjectModified { id });
        Ok(())
    }

    /// Appends samples to an in-progress stroke
    pub fn append_stroke_points(&mut self, id: usize, points: &[Pos2]) -> Result<(), SceneError> {
        let stroke = self
            .get_mut(id)?
            .as_stroke_mut()
            .ok_or(SceneError::NotAStroke(id))?;
        stroke.extend(points);
        self.events.emit(SceneEvent::ObjectModified { id });
        Ok(())
    }

    fn clear_selection_flags(&mut self) -> bool {
        let mut changed = false;
        for object in &mut self.objects {
            if object.is_selected() {
                object.set_selected(false);
                changed = true;
            }
        }
        changed
    }

    /// Makes `id` the only selected object
    pub fn select(&mut self, id: usize) -> Result<(), SceneError> {
        if self.get(id).is_none() {
            return Err(SceneError::NotFound(id));
        }
        self.clear_selection_flags();
        self.get_mut(id)?.set_selected(true);
        self.events.emit(SceneEvent::SelectionChanged { id: Some(id) });
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        if self.clear_selection_flags() {
            self.events.emit(SceneEvent::SelectionChanged { id: None });
        }
    }

    pub fn selected(&self) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.is_selected())
    }

    /// Topmost object under `pos`
    pub fn hit_test(&self, pos: Pos2) -> Option<usize> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.hit_test(pos))
            .map(|o| o.id())
    }

    /// Captures objects, background and dimensions
    pub fn serialize(&self) -> Result<Snapshot, SnapshotError> {
        let data = SceneDataRef {
            width: self.width,
            height: self.height,
            background: self.background,
            objects: &self.objects,
        };
        let images = self
            .objects
            .iter()
            .filter_map(SceneObject::as_image)
            .map(|image| (image.id(), image.payload()))
            .collect();
        Ok(Snapshot {
            json: serde_json::to_string(&data)?,
            images,
        })
    }

    /// Replaces the whole scene with the snapshot's content.
    ///
    /// The snapshot is fully parsed and validated first; on error the scene
    /// is left exactly as it was.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let mut data: SceneData = serde_json::from_str(snapshot.as_str()).map_err(|err| {
            warn!("Rejected snapshot: {}", err);
            err
        })?;

        if data.width == 0 || data.height == 0 {
            return Err(SnapshotError::InvalidDimensions {
                width: data.width,
                height: data.height,
            });
        }

        let mut seen = HashSet::with_capacity(data.objects.len());
        for object in &data.objects {
            if object.id() > id_generator::MAX_RESTORABLE_ID {
                return Err(SnapshotError::IdOutOfRange(object.id()));
            }
            if !seen.insert(object.id()) {
                return Err(SnapshotError::DuplicateId(object.id()));
            }
        }

        for object in &mut data.objects {
            if let SceneObject::Image(image) = object {
                let payload = snapshot
                    .images
                    .get(&image.id())
                    .ok_or(SnapshotError::MissingImage(image.id()))?;
                image.attach_payload(payload.clone());
            }
        }

        if let Some(max_id) = seen.iter().max() {
            id_generator::reserve_through(*max_id);
        }

        self.width = data.width;
        self.height = data.height;
        self.background = data.background;
        self.objects = data.objects;
        self.events.emit(SceneEvent::Restored);
        Ok(())
    }

    /// Paints every object, bottom first, without the background
    pub fn paint_objects(&self, target: &mut RgbaImage) {
        for object in &self.objects {
            raster::paint_object(target, object);
        }
    }

    /// Renders the scene at its own dimensions
    pub fn rasterize(&self) -> RgbaImage {
        let mut target = RgbaImage::new(self.width, self.height);
        raster::fill(&mut target, self.background);
        self.paint_objects(&mut target);
        target
    }

    /// Rasterizes and encodes as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, ExportError> {
        encode_png(&self.rasterize())
    }

    /// Drains the change events emitted since the last call
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use crate::element::{BrushKind, ShapeGeometry};

    fn rect_shape(x: f32) -> SceneObject {
        factory::create_shape(
            ShapeGeometry::Rectangle {
                rect: Rect::from_min_size(Pos2::new(x, 10.0), Vec2::splat(20.0)),
            },
            Color32::RED,
            Color32::RED,
            1.0,
        )
    }

    fn square(offset: f32, color: Color32) -> SceneObject {
        factory::create_shape(
            ShapeGeometry::Rectangle {
                rect: Rect::from_min_size(Pos2::new(offset, offset), Vec2::splat(20.0)),
            },
            color,
            color,
            1.0,
        )
    }

    #[test]
    fn add_appends_and_notifies() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let a = scene.add_object(rect_shape(0.0));
        let b = scene.add_object(rect_shape(50.0));
        assert_eq!(scene.objects()[0].id(), a);
        assert_eq!(scene.objects()[1].id(), b);
        assert_eq!(
            scene.take_events(),
            vec![SceneEvent::ObjectAdded { id: a }, SceneEvent::ObjectAdded { id: b }]
        );
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        scene.add_object(rect_shape(0.0));
        scene.take_events();
        assert!(scene.remove_object(usize::MAX).is_none());
        assert_eq!(scene.len(), 1);
        assert!(!scene.has_pending_events());
    }

    #[test]
    fn clear_resets_background() {
        let mut scene = Scene::new(100, 100, Color32::BLACK);
        scene.add_object(rect_shape(0.0));
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.background(), DEFAULT_BACKGROUND);
    }

    #[test]
    fn restore_round_trips_state() {
        let mut scene = Scene::new(64, 48, Color32::LIGHT_BLUE);
        scene.add_object(rect_shape(5.0));
        scene.add_object(factory::create_stroke(
            vec![Pos2::new(1.0, 1.0), Pos2::new(9.0, 9.0)],
            3.0,
            Color32::BLACK,
            BrushKind::Pencil,
        ));
        let snapshot = scene.serialize().unwrap();

        let mut other = Scene::new(10, 10, DEFAULT_BACKGROUND);
        other.restore(&snapshot).unwrap();
        assert_eq!(other.objects(), scene.objects());
        assert_eq!((other.width(), other.height()), (64, 48));
        assert_eq!(other.serialize().unwrap(), snapshot);
    }

    #[test]
    fn malformed_restore_leaves_scene_unchanged() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        scene.add_object(rect_shape(0.0));
        let before = scene.serialize().unwrap();
        scene.take_events();

        let err = scene.restore(&Snapshot::from_json("{\"width\": 3")).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)));

        let zero = Snapshot::from_json(r#"{"width":0,"height":5,"background":[0,0,0,255],"objects":[]}"#);
        assert!(matches!(
            scene.restore(&zero),
            Err(SnapshotError::InvalidDimensions { width: 0, height: 5 })
        ));

        assert_eq!(scene.serialize().unwrap(), before);
        assert!(!scene.has_pending_events());
    }

    #[test]
    fn selection_is_not_an_edit_and_not_serialized() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let id = scene.add_object(rect_shape(0.0));
        let before = scene.serialize().unwrap();
        scene.take_events();

        scene.select(id).unwrap();
        let events = scene.take_events();
        assert!(events.iter().all(|e| !e.is_edit()));
        assert_eq!(scene.serialize().unwrap(), before);
    }

    #[test]
    fn ids_beyond_the_restorable_range_are_rejected() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        scene.add_object(SceneObject::Stroke(crate::element::Stroke::new(
            42,
            vec![Pos2::new(1.0, 1.0)],
            2.0,
            Color32::BLACK,
            BrushKind::Pencil,
        )));
        let crafted = scene
            .serialize()
            .unwrap()
            .as_str()
            .replace("\"id\":42", &format!("\"id\":{}", usize::MAX));

        let mut target = Scene::new(100, 100, DEFAULT_BACKGROUND);
        assert!(matches!(
            target.restore(&Snapshot::from_json(crafted)),
            Err(SnapshotError::IdOutOfRange(id)) if id == usize::MAX
        ));
        assert!(target.is_empty());
        assert!(id_generator::generate_id() <= id_generator::MAX_RESTORABLE_ID);
    }

    #[test]
    fn images_restore_from_shared_payloads() {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(8, 4, image::Rgba([9, 8, 7, 255]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let image = crate::element::Image::from_encoded(
            id_generator::generate_id(),
            std::sync::Arc::from(bytes),
            crate::element::Transform::default(),
        )
        .unwrap();
        let id = image.id();
        let mut scene = Scene::new(50, 50, DEFAULT_BACKGROUND);
        scene.add_object(SceneObject::Image(image));

        let snapshot = scene.serialize().unwrap();
        assert!(!snapshot.as_str().contains("source_data"));
        let original = scene.objects()[0].as_image().unwrap().source_data().as_ptr();
        assert_eq!(snapshot.image_data(id).map(<[u8]>::as_ptr), Some(original));

        let mut other = Scene::new(10, 10, DEFAULT_BACKGROUND);
        other.restore(&snapshot).unwrap();
        assert_eq!(other.objects(), scene.objects());
        assert_eq!(other.objects()[0].as_image().unwrap().pixels().dimensions(), (8, 4));

        // The text alone does not carry the image
        let text_only = Snapshot::from_json(snapshot.as_str());
        assert!(matches!(other.restore(&text_only), Err(SnapshotError::MissingImage(missing)) if missing == id));
    }

    #[test]
    fn later_objects_paint_over_earlier_ones() {
        let mut scene = Scene::new(60, 60, DEFAULT_BACKGROUND);
        scene.add_object(square(0.0, Color32::RED));
        scene.add_object(square(10.0, Color32::BLUE));

        let image = scene.rasterize();
        assert_eq!(image.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(15, 15).0, [0, 0, 255, 255]);
    }

    #[test]
    fn inserting_at_zero_paints_beneath() {
        let mut scene = Scene::new(60, 60, DEFAULT_BACKGROUND);
        scene.add_object(square(0.0, Color32::RED));
        scene.insert_object(0, square(10.0, Color32::BLUE));

        let image = scene.rasterize();
        assert_eq!(image.get_pixel(15, 15).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(25, 25).0, [0, 0, 255, 255]);
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let _below = scene.add_object(rect_shape(10.0));
        let above = scene.add_object(rect_shape(15.0));
        assert_eq!(scene.hit_test(Pos2::new(20.0, 20.0)), Some(above));
        assert_eq!(scene.hit_test(Pos2::new(90.0, 90.0)), None);
    }

    #[test]
    fn empty_scene_rasterizes_to_background() {
        let scene = Scene::new(16, 8, Color32::from_rgb(12, 34, 56));
        let image = scene.rasterize();
        assert_eq!(image.dimensions(), (16, 8));
        assert!(image.pixels().all(|p| p.0 == [12, 34, 56, 255]));
    }
}
