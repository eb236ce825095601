use egui::{Color32, Pos2, Rect, Vec2};

use crate::element::{Element, SceneObject};
use crate::error::{CommandResult, SceneError};
use crate::scene::Scene;

/// Scene mutations a tool or the canvas can request.
///
/// Executing a command is the only way tools change a scene; the scene's
/// change events then drive history recording.
#[derive(Clone, PartialEq)]
pub enum Command {
    /// Add an object on top of the paint order
    AddElement(SceneObject),

    /// Add an object at a paint-order index (0 is the bottom)
    InsertElement { index: usize, object: SceneObject },

    RemoveElement { id: usize },

    MoveElement { id: usize, delta: Vec2 },

    ResizeElement { id: usize, rect: Rect },

    /// Extend an in-progress stroke
    AppendPoints { id: usize, points: Vec<Pos2> },

    SelectElement { id: usize },

    ClearSelection,

    ClearScene,

    SetBackground(Color32),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::AddElement(object) => f
                .debug_struct("AddElement")
                .field("kind", &object.element_type())
                .field("id", &object.id())
                .finish(),
            Command::InsertElement { index, object } => f
                .debug_struct("InsertElement")
                .field("index", index)
                .field("kind", &object.element_type())
                .field("id", &object.id())
                .finish(),
            Command::RemoveElement { id } => f.debug_struct("RemoveElement").field("id", id).finish(),
            Command::MoveElement { id, delta } => f
                .debug_struct("MoveElement")
                .field("id", id)
                .field("delta", delta)
                .finish(),
            Command::ResizeElement { id, rect } => f
                .debug_struct("ResizeElement")
                .field("id", id)
                .field("rect", rect)
                .finish(),
            Command::AppendPoints { id, points } => f
                .debug_struct("AppendPoints")
                .field("id", id)
                .field("count", &points.len())
                .finish(),
            Command::SelectElement { id } => f.debug_struct("SelectElement").field("id", id).finish(),
            Command::ClearSelection => write!(f, "ClearSelection"),
            Command::ClearScene => write!(f, "ClearScene"),
            Command::SetBackground(color) => f.debug_tuple("SetBackground").field(color).finish(),
        }
    }
}

impl Command {
    /// Applies the command to `scene`
    pub fn execute(self, scene: &mut Scene) -> CommandResult {
        log::trace!("Executing {:?}", self);
        match self {
            Command::AddElement(object) => {
                scene.add_object(object);
            }
            Command::InsertElement { index, object } => {
                scene.insert_object(index, object);
            }
            Command::RemoveElement { id } => {
                scene.remove_object(id).ok_or(SceneError::NotFound(id))?;
            }
            Command::MoveElement { id, delta } => scene.translate_object(id, delta)?,
            Command::ResizeElement { id, rect } => scene.resize_object(id, rect)?,
            Command::AppendPoints { id, points } => scene.append_stroke_points(id, &points)?,
            Command::SelectElement { id } => scene.select(id)?,
            Command::ClearSelection => scene.deselect_all(),
            Command::ClearScene => scene.clear(),
            Command::SetBackground(color) => scene.set_background(color),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{factory, BrushKind};
    use crate::error::CommandError;
    use crate::scene::DEFAULT_BACKGROUND;

    #[test]
    fn append_points_extends_stroke() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let stroke = factory::create_stroke(vec![Pos2::new(1.0, 1.0)], 2.0, Color32::BLACK, BrushKind::Pencil);
        let id = stroke.id();
        Command::AddElement(stroke).execute(&mut scene).unwrap();
        Command::AppendPoints { id, points: vec![Pos2::new(5.0, 5.0)] }
            .execute(&mut scene)
            .unwrap();
        assert_eq!(scene.get(id).and_then(|o| o.as_stroke()).map(|s| s.points().len()), Some(2));
    }

    #[test]
    fn missing_target_is_an_error() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let result = Command::MoveElement { id: 999_999, delta: Vec2::X }.execute(&mut scene);
        assert_eq!(result, Err(CommandError::Scene(SceneError::NotFound(999_999))));
        let result = Command::RemoveElement { id: 999_999 }.execute(&mut scene);
        assert!(result.is_err());
    }

    #[test]
    fn insert_element_lands_at_bottom() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let top = factory::create_stroke(vec![Pos2::ZERO], 1.0, Color32::BLACK, BrushKind::Pencil);
        let bottom = factory::create_stroke(vec![Pos2::ZERO], 1.0, Color32::BLACK, BrushKind::Pencil);
        let bottom_id = bottom.id();
        Command::AddElement(top).execute(&mut scene).unwrap();
        let insert = Command::InsertElement { index: 0, object: bottom };
        insert.execute(&mut scene).unwrap();
        assert_eq!(scene.objects()[0].id(), bottom_id);
    }
}
