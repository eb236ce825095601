use std::time::Duration;

use log::{debug, error, warn};
use uuid::Uuid;

use super::debounce::Debouncer;
use crate::error::HistoryNotice;
use crate::scene::{Scene, Snapshot};

/// One recorded state of a layer's scene
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    layer_id: Uuid,
    snapshot: Snapshot,
}

impl HistoryEntry {
    pub fn new(layer_id: Uuid, snapshot: Snapshot) -> Self {
        Self { layer_id, snapshot }
    }

    /// Layer that was active when the entry was captured
    pub fn layer_id(&self) -> Uuid {
        self.layer_id
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Snapshot history of one scene with a cursor.
///
/// The cursor points at the entry matching what is on screen; entries past it
/// are the redo future. Edits are not recorded when they happen: each one
/// re-arms a debounce deadline and the scene's latest state is appended once
/// the deadline passes, on [`History::flush`], or before undo/redo.
#[derive(Debug)]
pub struct History {
    layer_id: Uuid,
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    debounce: Debouncer,
    /// Raised while a snapshot is being applied so its events are ignored
    restoring: bool,
}

impl History {
    /// Creates an empty history; nothing can be undone until something is recorded
    pub fn new(layer_id: Uuid, window: Duration) -> Self {
        Self {
            layer_id,
            entries: Vec::new(),
            cursor: None,
            debounce: Debouncer::new(window),
            restoring: false,
        }
    }

    /// Creates a history whose first entry is the scene's current state
    pub fn seeded(layer_id: Uuid, window: Duration, scene: &mut Scene) -> Self {
        let mut history = Self::new(layer_id, window);
        scene.take_events();
        history.capture(scene);
        history
    }

    /// Appends an entry, discarding the redo future
    pub fn record(&mut self, entry: HistoryEntry) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        } else {
            self.entries.clear();
        }
        self.entries.push(entry);
        self.cursor = Some(self.entries.len() - 1);
        debug!(
            "Recorded history entry {} for layer {}",
            self.entries.len() - 1,
            self.layer_id
        );
    }

    fn capture(&mut self, scene: &Scene) -> bool {
        match scene.serialize() {
            Ok(snapshot) => {
                self.record(HistoryEntry::new(self.layer_id, snapshot));
                true
            }
            Err(err) => {
                error!("Failed to snapshot layer {}: {}", self.layer_id, err);
                false
            }
        }
    }

    /// Re-arms the debounce deadline for a scene edit made at `now`
    pub fn note_change(&mut self, now: Duration) {
        if self.restoring {
            return;
        }
        self.debounce.arm(now);
    }

    /// Drains the scene's pending events, noting a change if any was an edit
    pub fn observe(&mut self, scene: &mut Scene, now: Duration) -> bool {
        let edited = scene.take_events().iter().any(|event| event.is_edit());
        if edited {
            self.note_change(now);
        }
        edited
    }

    /// Records the scene once the debounce deadline has passed.
    ///
    /// Returns true if an entry was appended.
    pub fn poll(&mut self, now: Duration, scene: &mut Scene) -> bool {
        self.observe(scene, now);
        if !self.debounce.is_due(now) {
            return false;
        }
        self.debounce.cancel();
        self.capture(scene)
    }

    /// Records a pending change immediately.
    ///
    /// Returns true if an entry was appended.
    pub fn flush(&mut self, scene: &mut Scene) -> bool {
        self.observe(scene, Duration::ZERO);
        if !self.debounce.is_armed() {
            return false;
        }
        self.debounce.cancel();
        self.capture(scene)
    }

    /// Steps back one entry
    pub fn undo(&mut self, scene: &mut Scene) -> Result<(), HistoryNotice> {
        self.flush(scene);
        let target = match self.cursor {
            Some(cursor) if cursor > 0 => cursor - 1,
            _ => return Err(HistoryNotice::NothingToUndo),
        };
        self.apply(scene, target)?;
        debug!("Undo on layer {} -> entry {}", self.layer_id, target);
        Ok(())
    }

    /// Steps forward one entry
    pub fn redo(&mut self, scene: &mut Scene) -> Result<(), HistoryNotice> {
        self.flush(scene);
        let target = match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => cursor + 1,
            _ => return Err(HistoryNotice::NothingToRedo),
        };
        self.apply(scene, target)?;
        debug!("Redo on layer {} -> entry {}", self.layer_id, target);
        Ok(())
    }

    /// Restores `entries[index]`; the cursor only moves if the restore succeeds
    fn apply(&mut self, scene: &mut Scene, index: usize) -> Result<(), HistoryNotice> {
        self.restoring = true;
        let result = scene.restore(self.entries[index].snapshot());
        // Restore events describe the history itself, not a new edit
        self.observe(scene, Duration::ZERO);
        self.restoring = false;

        match result {
            Ok(()) => {
                self.cursor = Some(index);
                Ok(())
            }
            Err(err) => {
                warn!("History entry {} could not be restored: {}", index, err);
                Err(HistoryNotice::RestoreFailed)
            }
        }
    }

    pub fn layer_id(&self) -> Uuid {
        self.layer_id
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether a change is waiting for its debounce deadline
    pub fn has_pending(&self) -> bool {
        self.debounce.is_armed()
    }

    pub fn can_undo(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor > 0 || self.has_pending(),
            None => false,
        }
    }

    pub fn can_redo(&self) -> bool {
        !self.has_pending()
            && self
                .cursor
                .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use crate::element::ShapeGeometry;
    use crate::scene::DEFAULT_BACKGROUND;
    use egui::{Color32, Pos2, Rect, Vec2};

    const WINDOW: Duration = Duration::from_millis(300);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn square(scene: &mut Scene, x: f32) -> usize {
        scene.add_object(factory::create_shape(
            ShapeGeometry::Rectangle {
                rect: Rect::from_min_size(Pos2::new(x, 0.0), Vec2::splat(10.0)),
            },
            Color32::BLUE,
            Color32::BLUE,
            1.0,
        ))
    }

    fn setup() -> (Scene, History) {
        let mut scene = Scene::new(50, 50, DEFAULT_BACKGROUND);
        let history = History::seeded(Uuid::new_v4(), WINDOW, &mut scene);
        (scene, history)
    }

    #[test]
    fn seeded_history_has_one_entry() {
        let (_scene, history) = setup();
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), Some(0));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn record_truncates_redo_future() {
        let (mut scene, mut history) = setup();
        square(&mut scene, 0.0);
        history.flush(&mut scene);
        square(&mut scene, 20.0);
        history.flush(&mut scene);
        history.undo(&mut scene).unwrap();
        assert_eq!(history.cursor(), Some(1));

        history.record(HistoryEntry::new(history.layer_id(), scene.serialize().unwrap()));
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn poll_waits_for_quiescence() {
        let (mut scene, mut history) = setup();
        square(&mut scene, 0.0);
        assert!(!history.poll(ms(0), &mut scene));
        square(&mut scene, 10.0);
        assert!(!history.poll(ms(200), &mut scene));
        assert!(!history.poll(ms(450), &mut scene));
        assert!(history.poll(ms(500), &mut scene));
        assert_eq!(history.len(), 2);
        assert!(!history.poll(ms(2000), &mut scene));
    }

    #[test]
    fn restore_does_not_schedule_a_record() {
        let (mut scene, mut history) = setup();
        square(&mut scene, 0.0);
        history.flush(&mut scene);
        history.undo(&mut scene).unwrap();
        assert!(!history.has_pending());
        assert!(!history.poll(ms(10_000), &mut scene));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn undo_at_start_reports_notice() {
        let (mut scene, mut history) = setup();
        assert_eq!(history.undo(&mut scene), Err(HistoryNotice::NothingToUndo));
        assert_eq!(history.redo(&mut scene), Err(HistoryNotice::NothingToRedo));
    }

    #[test]
    fn corrupt_entry_keeps_cursor() {
        let (mut scene, mut history) = setup();
        history.record(HistoryEntry::new(history.layer_id(), Snapshot::from_json("not json")));
        square(&mut scene, 0.0);
        history.flush(&mut scene);
        assert_eq!(history.cursor(), Some(2));

        assert_eq!(history.undo(&mut scene), Err(HistoryNotice::RestoreFailed));
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(scene.len(), 1);
    }
}
