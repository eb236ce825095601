use std::sync::Arc;

use eframe::egui;

/// Image file dropped onto the window, ready for import
#[derive(Debug, Clone)]
pub struct DroppedImage {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

/// Collects image files dropped onto the window
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up this frame's dropped files; returns true if there were any
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files.extend(i.raw.dropped_files.iter().cloned());
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Drains the pending files, reading the bytes of every image among them
    pub fn take_images(&mut self) -> Vec<DroppedImage> {
        std::mem::take(&mut self.dropped_files)
            .into_iter()
            .filter_map(|file| {
                let name = display_name(&file);
                if !is_image_file(&file) {
                    log::warn!("Dropped file is not a supported type: {}", name);
                    return None;
                }
                read_bytes(&file, &name).map(|bytes| DroppedImage { name, bytes })
            })
            .collect()
    }

    /// Dims the window while files are dragged over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Drop to import:\n".to_owned();
            for file in &i.raw.hovered_files {
                match &file.path {
                    Some(path) => text += &format!("\n{}", path.display()),
                    None => text += "\n(image)",
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Checks the MIME type, falling back to the extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| file.name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()));
    matches!(name.as_deref(), Some("png" | "jpg" | "jpeg"))
}

fn read_bytes(file: &egui::DroppedFile, name: &str) -> Option<Arc<[u8]>> {
    if let Some(bytes) = &file.bytes {
        log::info!("Importing {} from memory ({} bytes)", name, bytes.len());
        return Some(bytes.clone());
    }

    // No filesystem access on the web
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = &file.path {
            return match std::fs::read(path) {
                Ok(bytes) => {
                    log::info!("Importing {} ({} bytes)", name, bytes.len());
                    Some(Arc::from(bytes))
                }
                Err(err) => {
                    log::error!("Failed to read {}: {}", name, err);
                    None
                }
            };
        }
    }

    log::warn!("Dropped file has no accessible data: {}", name);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped(name: &str, mime: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_owned(),
            mime: mime.to_owned(),
            bytes: Some(Arc::from(vec![1u8, 2, 3])),
            ..Default::default()
        }
    }

    #[test]
    fn only_images_are_taken() {
        let mut handler = FileHandler::new();
        handler.dropped_files = vec![dropped("a.png", ""), dropped("notes.txt", "text/plain"), dropped("b", "image/jpeg")];
        let images = handler.take_images();
        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b"]);
        assert!(handler.take_images().is_empty());
    }
}
