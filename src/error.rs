use thiserror::Error;

/// Errors raised when a snapshot cannot be applied to a scene.
///
/// A scene that fails to restore keeps its previous contents.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Duplicate object id {0} in snapshot")]
    DuplicateId(usize),

    #[error("Object id {0} is out of range")]
    IdOutOfRange(usize),

    #[error("Snapshot carries no data for image {0}")]
    MissingImage(usize),
}

/// Errors from direct scene edits
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("Object {0} not found")]
    NotFound(usize),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Object {0} is not a stroke")]
    NotAStroke(usize),
}

/// Errors that can occur during command execution
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Non-fatal outcomes of undo/redo that are reported to the user.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HistoryNotice {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("History entry could not be restored")]
    RestoreFailed,
}

/// Errors that can occur while importing an image onto the canvas
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    Empty,
}

/// Errors that can occur while exporting the canvas
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write export: {0}")]
    Write(#[from] std::io::Error),
}

/// Errors from layer registry lookups
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayerError {
    #[error("Layer {0} not found")]
    NotFound(uuid::Uuid),
}
