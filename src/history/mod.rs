//! Debounced snapshot history for undo and redo

mod debounce;
mod stack;

pub use debounce::{Debouncer, DEFAULT_WINDOW};
pub use stack::{History, HistoryEntry};
