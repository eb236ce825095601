use eframe::egui;

use crate::SketchApp;

pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::both().show(ui, |ui| {
            let size = app.surface().active_scene().size();
            let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
            app.handle_canvas_input(ctx, response.rect);
            app.render_canvas(&painter, response.rect);
        });
    });
}
