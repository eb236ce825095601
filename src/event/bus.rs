use crate::event::SceneEvent;

/// Outbox of scene events waiting to be drained by the scene's owner
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    pending: Vec<SceneEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: SceneEvent) {
        self.pending.push(event);
    }

    /// Removes and returns everything emitted since the last drain
    pub fn drain(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
