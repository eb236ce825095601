use eframe::egui;

use crate::SketchApp;

pub fn layers_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Layers");
                if ui.button("+").on_hover_text("Add layer").clicked() {
                    app.surface_mut().add_layer();
                }
            });
            ui.separator();

            let rows: Vec<_> = app
                .surface()
                .layers()
                .iter()
                .enumerate()
                .map(|(index, layer)| (index, layer.id(), layer.name().to_owned(), layer.is_visible(), layer.is_active()))
                .collect();
            let count = rows.len();

            // Topmost layer first, as in most paint programs
            for (index, id, name, visible, active) in rows.into_iter().rev() {
                ui.horizontal(|ui| {
                    let mut shown = visible;
                    if ui.checkbox(&mut shown, "").on_hover_text("Visible").changed() {
                        log_layer_error(app.surface_mut().set_layer_visible(id, shown));
                    }

                    if app.renaming_layer() == Some(id) {
                        if let Some(buffer) = app.rename_buffer() {
                            let response = ui.text_edit_singleline(buffer);
                            if response.lost_focus() {
                                app.finish_rename();
                            } else if !response.has_focus() {
                                response.request_focus();
                            }
                        }
                    } else {
                        let label = ui.selectable_label(active, name.as_str());
                        if label.clicked() && !active {
                            log_layer_error(app.surface_mut().switch_layer(id));
                        }
                        if label.double_clicked() {
                            app.start_rename(id, &name);
                        }
                    }

                    if ui.add_enabled(index + 1 < count, egui::Button::new("⬆")).clicked() {
                        log_layer_error(app.surface_mut().move_layer(id, index + 1));
                    }
                    if ui.add_enabled(index > 0, egui::Button::new("⬇")).clicked() {
                        log_layer_error(app.surface_mut().move_layer(id, index - 1));
                    }
                });
            }
        });
}

fn log_layer_error(result: Result<(), crate::error::LayerError>) {
    if let Err(err) = result {
        log::warn!("{}", err);
    }
}
