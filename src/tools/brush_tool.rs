use std::f32::consts::TAU;

use egui::{Pos2, Vec2};
use log::trace;
use rand::rngs::StdRng;
use rand::Rng;

use crate::command::Command;
use crate::element::{factory, BrushKind, Element};
use crate::scene::Scene;
use crate::tools::{Tool, ToolState, MIN_SAMPLE_DISTANCE};

/// Stroke currently being laid down
#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    id: usize,
    last: Pos2,
}

/// Freehand tool shared by the pencil, spray and eraser modes.
///
/// The stroke goes into the scene on pointer-down and grows with each
/// accepted sample, so it is visible while it is drawn.
#[derive(Debug)]
pub struct BrushTool {
    kind: BrushKind,
    current: Option<ActiveStroke>,
    rng: StdRng,
}

impl BrushTool {
    pub fn new(kind: BrushKind, rng: StdRng) -> Self {
        Self {
            kind,
            current: None,
            rng,
        }
    }

    pub fn kind(&self) -> BrushKind {
        self.kind
    }

    /// Uniformly distributed dot centres within the spray disc around `center`
    fn scatter(&mut self, center: Pos2, state: &ToolState) -> Vec<Pos2> {
        let radius = state.width * state.spray_radius_factor;
        (0..state.spray_density.max(1))
            .map(|_| {
                // sqrt keeps the density even across the disc
                let r = radius * self.rng.random::<f32>().sqrt();
                let angle = self.rng.random::<f32>() * TAU;
                center + Vec2::angled(angle) * r
            })
            .collect()
    }
}

impl Tool for BrushTool {
    fn name(&self) -> &'static str {
        match self.kind {
            BrushKind::Pencil => "Pencil",
            BrushKind::Spray => "Spray",
            BrushKind::Eraser => "Eraser",
        }
    }

    fn deactivate(&mut self) {
        self.current = None;
    }

    fn on_pointer_down(&mut self, pos: Pos2, scene: &Scene, state: &ToolState) -> Option<Command> {
        let color = match self.kind {
            BrushKind::Eraser => state.canvas_background.unwrap_or_else(|| scene.background()),
            BrushKind::Pencil | BrushKind::Spray => state.color,
        };
        let points = match self.kind {
            BrushKind::Spray => self.scatter(pos, state),
            BrushKind::Pencil | BrushKind::Eraser => vec![pos],
        };

        let stroke = factory::create_stroke(points, state.width, color, self.kind);
        trace!("{} stroke {} started at {:?}", self.name(), stroke.id(), pos);
        self.current = Some(ActiveStroke {
            id: stroke.id(),
            last: pos,
        });
        Some(Command::AddElement(stroke))
    }

    fn on_pointer_move(&mut self, pos: Pos2, _scene: &Scene, state: &ToolState) -> Option<Command> {
        let active = self.current?;
        let points = match self.kind {
            BrushKind::Spray => self.scatter(pos, state),
            BrushKind::Pencil | BrushKind::Eraser => {
                if pos.distance(active.last) < MIN_SAMPLE_DISTANCE {
                    return None;
                }
                vec![pos]
            }
        };

        self.current = Some(ActiveStroke { last: pos, ..active });
        Some(Command::AppendPoints {
            id: active.id,
            points,
        })
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _scene: &Scene, _state: &ToolState) -> Option<Command> {
        if let Some(stroke) = self.current.take() {
            trace!("Stroke {} finished", stroke.id);
        }
        None
    }

    fn is_busy(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DEFAULT_BACKGROUND;
    use egui::Color32;
    use rand::SeedableRng;

    fn tool(kind: BrushKind) -> BrushTool {
        BrushTool::new(kind, StdRng::seed_from_u64(7))
    }

    fn run(scene: &mut Scene, command: Option<Command>) {
        if let Some(command) = command {
            command.execute(scene).unwrap();
        }
    }

    #[test]
    fn pencil_skips_samples_closer_than_a_pixel() {
        let mut scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let state = ToolState::default();
        let mut pencil = tool(BrushKind::Pencil);

        let down = pencil.on_pointer_down(Pos2::new(10.0, 10.0), &scene, &state);
        run(&mut scene, down);
        assert!(pencil.on_pointer_move(Pos2::new(10.5, 10.0), &scene, &state).is_none());
        let step = pencil.on_pointer_move(Pos2::new(12.0, 10.0), &scene, &state);
        run(&mut scene, step);
        pencil.on_pointer_up(Pos2::new(12.0, 10.0), &scene, &state);

        let stroke = scene.objects()[0].as_stroke().unwrap();
        assert_eq!(stroke.points(), &[Pos2::new(10.0, 10.0), Pos2::new(12.0, 10.0)]);
        assert!(!pencil.is_busy());
    }

    #[test]
    fn eraser_paints_with_background() {
        let scene = Scene::new(100, 100, Color32::from_rgb(1, 2, 3));
        let state = ToolState {
            color: Color32::RED,
            ..ToolState::default()
        };
        let mut eraser = tool(BrushKind::Eraser);
        let Some(Command::AddElement(object)) = eraser.on_pointer_down(Pos2::new(5.0, 5.0), &scene, &state)
        else {
            panic!("eraser did not start a stroke");
        };
        assert_eq!(object.as_stroke().unwrap().color(), Color32::from_rgb(1, 2, 3));
    }

    #[test]
    fn spray_scatters_density_dots_within_radius() {
        let scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let state = ToolState {
            width: 10.0,
            spray_density: 15,
            spray_radius_factor: 2.0,
            ..ToolState::default()
        };
        let mut spray = tool(BrushKind::Spray);
        let center = Pos2::new(50.0, 50.0);
        let Some(Command::AddElement(object)) = spray.on_pointer_down(center, &scene, &state) else {
            panic!("spray did not start a stroke");
        };
        let dots = object.as_stroke().unwrap().points();
        assert_eq!(dots.len(), 15);
        assert!(dots.iter().all(|dot| dot.distance(center) <= 20.0 + 1e-3));

        let Some(Command::AppendPoints { points, .. }) =
            spray.on_pointer_move(Pos2::new(50.2, 50.0), &scene, &state)
        else {
            panic!("spray move did not scatter");
        };
        assert_eq!(points.len(), 15);
    }

    #[test]
    fn move_without_press_does_nothing() {
        let scene = Scene::new(100, 100, DEFAULT_BACKGROUND);
        let mut pencil = tool(BrushKind::Pencil);
        assert!(pencil
            .on_pointer_move(Pos2::new(1.0, 1.0), &scene, &ToolState::default())
            .is_none());
    }
}
