use eframe::egui;

use crate::tools::ToolMode;
use crate::SketchApp;

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let current = app.surface().mode();
            for mode in ToolMode::ALL {
                // Clicking a shape mode again inserts another shape
                if ui.selectable_label(current == mode, mode.label()).clicked() {
                    log::info!("Tool selected from UI: {}", mode.label());
                    app.surface_mut().set_mode(mode);
                }
            }
            ui.separator();

            let state = app.surface().tool_state().clone();
            let mut color = state.color;
            ui.horizontal(|ui| {
                ui.label("Color:");
                egui::color_picker::color_edit_button_srgba(ui, &mut color, egui::color_picker::Alpha::OnlyBlend);
            });
            if color != state.color {
                app.surface_mut().set_color(color);
            }

            let current_background = app.surface().background();
            let mut background = current_background;
            ui.horizontal(|ui| {
                ui.label("Background:");
                egui::color_picker::color_edit_button_srgba(ui, &mut background, egui::color_picker::Alpha::Opaque);
            });
            if background != current_background {
                app.surface_mut().set_background(background);
            }

            let mut width = state.width;
            ui.horizontal(|ui| {
                ui.label("Width:");
                ui.add(egui::Slider::new(&mut width, 1.0..=50.0));
            });
            if width != state.width {
                app.surface_mut().set_width(width);
            }

            if state.mode == ToolMode::Spray {
                let mut density = state.spray_density;
                ui.horizontal(|ui| {
                    ui.label("Density:");
                    ui.add(egui::Slider::new(&mut density, 1..=100));
                });
                if density != state.spray_density {
                    app.surface_mut().set_spray_density(density);
                }
            }
            ui.separator();

            ui.horizontal(|ui| {
                let history = app.surface().history();
                let (can_undo, can_redo) = (history.can_undo(), history.can_redo());
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    let _ = app.surface_mut().undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    let _ = app.surface_mut().redo();
                }
            });

            let history = app.surface().history();
            ui.label(format!(
                "History: {} of {}{}",
                history.cursor().map_or(0, |cursor| cursor + 1),
                history.len(),
                if history.has_pending() { " (pending)" } else { "" }
            ));
            ui.separator();

            let has_selection = app.surface().active_scene().selected().is_some();
            if ui.add_enabled(has_selection, egui::Button::new("Delete selected")).clicked() {
                app.surface_mut().delete_selected();
            }
            if ui.button("Clear layer").clicked() {
                app.surface_mut().clear_active_layer();
            }
            if ui.button("Export PNG").clicked() {
                app.export();
            }
        });
}
