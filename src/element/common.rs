use egui::{Pos2, Rect};

use crate::error::SceneError;

// Common constants for all element types
pub const MIN_ELEMENT_SIZE: f32 = 2.0;
/// Pointer slack when picking thin strokes and lines
pub const HIT_TOLERANCE: f32 = 4.0;
/// Distance from a selection corner that still grabs the resize handle
pub const RESIZE_HANDLE_RADIUS: f32 = 8.0;

/// A corner of an object's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn position(&self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.left_top(),
            Corner::TopRight => rect.right_top(),
            Corner::BottomLeft => rect.left_bottom(),
            Corner::BottomRight => rect.right_bottom(),
        }
    }

    /// Rect obtained by dragging this corner of `original` to `pos`,
    /// keeping the opposite corner fixed.
    pub fn drag_rect(&self, original: Rect, pos: Pos2) -> Rect {
        let mut rect = original;
        match self {
            Corner::TopLeft => rect.min = pos,
            Corner::TopRight => {
                rect.max.x = pos.x;
                rect.min.y = pos.y;
            }
            Corner::BottomLeft => {
                rect.min.x = pos.x;
                rect.max.y = pos.y;
            }
            Corner::BottomRight => rect.max = pos,
        }

        // Dragging past the opposite corner flips the box; clamp to the minimum instead
        if rect.width() < MIN_ELEMENT_SIZE {
            match self {
                Corner::TopLeft | Corner::BottomLeft => rect.min.x = rect.max.x - MIN_ELEMENT_SIZE,
                Corner::TopRight | Corner::BottomRight => rect.max.x = rect.min.x + MIN_ELEMENT_SIZE,
            }
        }
        if rect.height() < MIN_ELEMENT_SIZE {
            match self {
                Corner::TopLeft | Corner::TopRight => rect.min.y = rect.max.y - MIN_ELEMENT_SIZE,
                Corner::BottomLeft | Corner::BottomRight => rect.max.y = rect.min.y + MIN_ELEMENT_SIZE,
            }
        }
        rect
    }
}

/// Returns the corner of `rect` whose handle lies under `pos`
pub fn corner_under(rect: Rect, pos: Pos2) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|corner| corner.position(rect).distance(pos) <= RESIZE_HANDLE_RADIUS)
}

/// Validates that a rectangle has minimum dimensions
pub(crate) fn validate_rect(rect: &Rect) -> Result<(), SceneError> {
    if !(rect.width() >= MIN_ELEMENT_SIZE && rect.height() >= MIN_ELEMENT_SIZE) {
        Err(SceneError::InvalidGeometry(format!(
            "Element dimensions too small (min: {}). Width: {}, Height: {}",
            MIN_ELEMENT_SIZE,
            rect.width(),
            rect.height()
        )))
    } else {
        Ok(())
    }
}

/// Calculate distance from a point to a line segment
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Maps `point` from `from` into the same relative position inside `to`.
/// Degenerate source axes collapse onto the centre of the target axis.
pub(crate) fn remap_point(point: Pos2, from: Rect, to: Rect) -> Pos2 {
    let x = if from.width() > 0.0 {
        to.min.x + (point.x - from.min.x) / from.width() * to.width()
    } else {
        to.center().x
    };
    let y = if from.height() > 0.0 {
        to.min.y + (point.y - from.min.y) / from.height() * to.height()
    } else {
        to.center().y
    };
    Pos2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance_handles_endpoints_and_interior() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_line_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_line_segment(Pos2::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_line_segment(Pos2::new(1.0, 1.0), a, a), 2f32.sqrt());
    }

    #[test]
    fn dragging_a_corner_keeps_the_opposite_one() {
        let rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0));
        let dragged = Corner::BottomRight.drag_rect(rect, Pos2::new(30.0, 20.0));
        assert_eq!(dragged.min, Pos2::new(0.0, 0.0));
        assert_eq!(dragged.max, Pos2::new(30.0, 20.0));

        let collapsed = Corner::TopLeft.drag_rect(rect, Pos2::new(50.0, 50.0));
        assert_eq!(collapsed.width(), MIN_ELEMENT_SIZE);
        assert_eq!(collapsed.height(), MIN_ELEMENT_SIZE);
    }

    #[test]
    fn corner_lookup_uses_handle_radius() {
        let rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 100.0));
        assert_eq!(corner_under(rect, Pos2::new(99.0, 2.0)), Some(Corner::TopRight));
        assert_eq!(corner_under(rect, Pos2::new(50.0, 50.0)), None);
    }
}
