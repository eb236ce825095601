use egui::{Pos2, Rect};
use log::debug;

use crate::command::Command;
use crate::element::{corner_under, Corner, Element};
use crate::scene::Scene;
use crate::tools::{Tool, ToolState};

/// What the selection tool is holding on to
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Idle,
    Dragging {
        id: usize,
        last: Pos2,
    },
    Resizing {
        id: usize,
        corner: Corner,
        original_rect: Rect,
    },
}

/// Selects, moves and resizes existing objects
#[derive(Debug, Clone)]
pub struct SelectionTool {
    state: SelectionState,
}

impl SelectionTool {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn current_state_name(&self) -> &'static str {
        match self.state {
            SelectionState::Idle => "Idle",
            SelectionState::Dragging { .. } => "Dragging",
            SelectionState::Resizing { .. } => "Resizing",
        }
    }
}

impl Default for SelectionTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SelectionTool {
    fn name(&self) -> &'static str {
        "Select"
    }

    fn deactivate(&mut self) {
        self.state = SelectionState::Idle;
    }

    fn on_pointer_down(&mut self, pos: Pos2, scene: &Scene, _state: &ToolState) -> Option<Command> {
        // Handles of the current selection win over whatever lies beneath them
        if let Some(selected) = scene.selected() {
            let rect = selected.rect();
            if let Some(corner) = corner_under(rect, pos) {
                debug!("Resizing {} from {:?}", selected.id(), corner);
                self.state = SelectionState::Resizing {
                    id: selected.id(),
                    corner,
                    original_rect: rect,
                };
                return None;
            }
        }

        match scene.hit_test(pos) {
            Some(id) => {
                self.state = SelectionState::Dragging { id, last: pos };
                let already_selected = scene.selected().is_some_and(|o| o.id() == id);
                (!already_selected).then_some(Command::SelectElement { id })
            }
            None => {
                self.state = SelectionState::Idle;
                scene.selected().map(|_| Command::ClearSelection)
            }
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, _scene: &Scene, _state: &ToolState) -> Option<Command> {
        match &mut self.state {
            SelectionState::Idle => None,
            SelectionState::Dragging { id, last } => {
                let delta = pos - *last;
                if delta == egui::Vec2::ZERO {
                    return None;
                }
                *last = pos;
                Some(Command::MoveElement { id: *id, delta })
            }
            SelectionState::Resizing {
                id,
                corner,
                original_rect,
            } => Some(Command::ResizeElement {
                id: *id,
                rect: corner.drag_rect(*original_rect, pos),
            }),
        }
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _scene: &Scene, _state: &ToolState) -> Option<Command> {
        self.state = SelectionState::Idle;
        None
    }

    fn is_busy(&self) -> bool {
        self.state != SelectionState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{factory, ShapeGeometry};
    use crate::scene::DEFAULT_BACKGROUND;
    use egui::{Color32, Vec2};

    fn scene_with_square() -> (Scene, usize) {
        let mut scene = Scene::new(200, 200, DEFAULT_BACKGROUND);
        let id = scene.add_object(factory::create_shape(
            ShapeGeometry::Rectangle {
                rect: Rect::from_min_size(Pos2::new(50.0, 50.0), Vec2::splat(40.0)),
            },
            Color32::GREEN,
            Color32::GREEN,
            1.0,
        ));
        (scene, id)
    }

    #[test]
    fn press_on_object_selects_and_drags() {
        let (mut scene, id) = scene_with_square();
        let state = ToolState::default();
        let mut tool = SelectionTool::new();

        let select = tool.on_pointer_down(Pos2::new(60.0, 60.0), &scene, &state);
        assert_eq!(select, Some(Command::SelectElement { id }));
        select.unwrap().execute(&mut scene).unwrap();

        let step = tool.on_pointer_move(Pos2::new(70.0, 65.0), &scene, &state);
        assert_eq!(step, Some(Command::MoveElement { id, delta: Vec2::new(10.0, 5.0) }));
        assert!(tool.on_pointer_up(Pos2::new(70.0, 65.0), &scene, &state).is_none());
        assert!(!tool.is_busy());
    }

    #[test]
    fn press_on_corner_handle_resizes() {
        let (mut scene, id) = scene_with_square();
        scene.select(id).unwrap();
        let state = ToolState::default();
        let mut tool = SelectionTool::new();

        assert!(tool.on_pointer_down(Pos2::new(90.0, 90.0), &scene, &state).is_none());
        assert_eq!(tool.current_state_name(), "Resizing");
        let resize = tool.on_pointer_move(Pos2::new(120.0, 110.0), &scene, &state);
        assert_eq!(
            resize,
            Some(Command::ResizeElement {
                id,
                rect: Rect::from_min_max(Pos2::new(50.0, 50.0), Pos2::new(120.0, 110.0)),
            })
        );
    }

    #[test]
    fn press_on_empty_canvas_clears_selection() {
        let (mut scene, id) = scene_with_square();
        let state = ToolState::default();
        let mut tool = SelectionTool::new();
        assert!(tool.on_pointer_down(Pos2::new(5.0, 5.0), &scene, &state).is_none());

        scene.select(id).unwrap();
        assert_eq!(
            tool.on_pointer_down(Pos2::new(5.0, 5.0), &scene, &state),
            Some(Command::ClearSelection)
        );
        assert!(tool.on_pointer_move(Pos2::new(6.0, 6.0), &scene, &state).is_none());
    }
}
