use std::sync::atomic::{AtomicUsize, Ordering};

// Single static counter for all scene objects
static NEXT_OBJECT_ID: AtomicUsize = AtomicUsize::new(1);

/// Largest id a restored snapshot may carry; the rest of the range stays free
/// for ids generated afterwards
pub const MAX_RESTORABLE_ID: usize = usize::MAX / 2;

pub fn generate_id() -> usize {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::SeqCst)
}

/// Makes sure ids handed out later never collide with `id`.
///
/// Restoring a snapshot can bring back objects whose ids were minted
/// elsewhere, so the counter is pushed past the largest restored id.
pub fn reserve_through(id: usize) {
    NEXT_OBJECT_ID.fetch_max(id.saturating_add(1), Ordering::SeqCst);
}
