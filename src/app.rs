use eframe::egui;
use uuid::Uuid;

use crate::config::CanvasConfig;
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels::{central_panel, layers_panel, tools_panel};
use crate::renderer::Renderer;
use crate::surface::{CanvasSurface, Notice, NoticeLevel};
use crate::util::SystemClock;

/// How long a notice stays on screen, in seconds
const NOTICE_LIFETIME: f64 = 3.0;

/// The egui application hosting one drawing canvas
pub struct SketchApp {
    surface: CanvasSurface,
    renderer: Renderer,
    input: InputHandler,
    files: FileHandler,
    /// Notices on screen with the time they expire
    toasts: Vec<(Notice, f64)>,
    renaming: Option<(Uuid, String)>,
}

impl std::fmt::Debug for SketchApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SketchApp")
            .field("surface", &self.surface)
            .field("toasts", &self.toasts.len())
            .finish_non_exhaustive()
    }
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Restore the canvas settings of the previous session, if any
        let config: CanvasConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        log::info!("Starting with {:?}", config);

        Self {
            surface: CanvasSurface::new(config, Box::new(SystemClock::new())),
            renderer: Renderer::new(&cc.egui_ctx),
            input: InputHandler::new(egui::Rect::NOTHING),
            files: FileHandler::new(),
            toasts: Vec::new(),
            renaming: None,
        }
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut CanvasSurface {
        &mut self.surface
    }

    /// Routes this frame's pointer and keyboard input to the canvas at `canvas_rect`
    pub fn handle_canvas_input(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        self.input.set_canvas_rect(canvas_rect);
        for event in self.input.process_input(ctx) {
            self.surface.handle_input(&event);
        }
    }

    pub fn render_canvas(&mut self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        self.renderer.render(painter, canvas_rect, self.surface.layers());
    }

    /// Writes the composited canvas to the configured export path
    pub fn export(&mut self) {
        let path = self.surface.config().export_path.clone();
        // Failures are already reported as notices
        let _ = self.surface.export_to(&path);
    }

    pub fn renaming_layer(&self) -> Option<Uuid> {
        self.renaming.as_ref().map(|(id, _)| *id)
    }

    pub fn start_rename(&mut self, id: Uuid, name: &str) {
        self.renaming = Some((id, name.to_owned()));
    }

    pub fn rename_buffer(&mut self) -> Option<&mut String> {
        self.renaming.as_mut().map(|(_, buffer)| buffer)
    }

    pub fn finish_rename(&mut self) {
        if let Some((id, name)) = self.renaming.take() {
            if let Err(err) = self.surface.rename_layer(id, &name) {
                log::warn!("{}", err);
            }
        }
    }

    fn import_dropped_files(&mut self, ctx: &egui::Context) {
        self.files.preview_files_being_dropped(ctx);
        if !self.files.check_for_dropped_files(ctx) {
            return;
        }
        for image in self.files.take_images() {
            log::info!("Importing dropped file {}", image.name);
            // Failures become notices
            let _ = self.surface.import_image(&image.bytes);
        }
    }

    fn show_notices(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        for notice in self.surface.take_notices() {
            self.toasts.push((notice, now + NOTICE_LIFETIME));
        }
        self.toasts.retain(|(_, expires)| *expires > now);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (notice, _) in &self.toasts {
                    let color = match notice.level {
                        NoticeLevel::Info => ui.visuals().text_color(),
                        NoticeLevel::Warning => ui.visuals().warn_fg_color,
                        NoticeLevel::Error => ui.visuals().error_fg_color,
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(color, &notice.message);
                    });
                }
            });
        ctx.request_repaint_after(std::time::Duration::from_secs_f64(NOTICE_LIFETIME));
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let mut config = self.surface.config().clone();
        config.tool = self.surface.tool_state().clone();
        eframe::set_value(storage, eframe::APP_KEY, &config);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.import_dropped_files(ctx);

        tools_panel(self, ctx);
        layers_panel(self, ctx);
        central_panel(self, ctx);

        self.surface.tick();
        self.show_notices(ctx);

        if self.surface.take_repaint() {
            ctx.request_repaint();
        }
        // Keep frames coming until pending edits are recorded
        if self.surface.layers().iter().any(|layer| layer.history().has_pending()) {
            ctx.request_repaint_after(self.surface.config().debounce_window());
        }
    }
}
