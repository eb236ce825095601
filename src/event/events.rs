/// Changes a scene reports to whoever owns it.
///
/// Every variant except `SelectionChanged` is an edit and feeds the history.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ObjectAdded { id: usize },
    ObjectRemoved { id: usize },
    ObjectModified { id: usize },
    BackgroundChanged,
    Cleared,
    /// Whole state replaced from a snapshot
    Restored,
    SelectionChanged { id: Option<usize> },
}

impl SceneEvent {
    /// Returns true if the event changes what the scene paints
    pub fn is_edit(&self) -> bool {
        !matches!(self, SceneEvent::SelectionChanged { .. })
    }
}
