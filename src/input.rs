use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Where an input event happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// Position in canvas pixels, relative to the canvas' top-left corner
    pub position: Pos2,
    /// Whether this position is within the canvas bounds
    pub is_in_canvas: bool,
}

/// Input the canvas surface understands, already in canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        location: InputLocation,
        button: PointerButton,
    },
    PointerUp {
        location: InputLocation,
        button: PointerButton,
    },
    /// Pointer moved, with the buttons held at the time
    PointerMove {
        location: InputLocation,
        held_buttons: Vec<PointerButton>,
    },
    /// Pointer left the window
    PointerLeave {
        last_known_location: InputLocation,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Keyboard shortcut this event triggers, if any
    pub fn shortcut(&self) -> Option<Shortcut> {
        match self {
            InputEvent::KeyDown { key, modifiers } => Shortcut::from_key(*key, *modifiers),
            _ => None,
        }
    }
}

/// Keyboard actions on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    DeleteSelected,
}

impl Shortcut {
    /// Maps a key press using the platform command key (Cmd on macOS, Ctrl elsewhere)
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        match key {
            Key::Z if modifiers.command && modifiers.shift => Some(Shortcut::Redo),
            Key::Z if modifiers.command => Some(Shortcut::Undo),
            Key::Delete | Key::Backspace => Some(Shortcut::DeleteSelected),
            _ => None,
        }
    }
}

/// Turns raw egui input into canvas [`InputEvent`]s
#[derive(Debug, Clone)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
        }
    }

    /// Screen rectangle the canvas currently occupies
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    /// Converts a screen position into an [`InputLocation`]
    pub fn locate(&self, screen_pos: Pos2) -> InputLocation {
        InputLocation {
            position: (screen_pos - self.canvas_rect.min).to_pos2(),
            is_in_canvas: self.canvas_rect.contains(screen_pos),
        }
    }

    /// Collects this frame's events; text-entry keys are left to focused widgets
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let keyboard_free = !ctx.wants_keyboard_input();
        let mut events = Vec::new();

        ctx.input(|input| {
            if let Some(pos) = input.pointer.hover_pos() {
                if Some(pos) != self.last_pointer_pos {
                    let held_buttons = [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle]
                        .into_iter()
                        .filter(|button| input.pointer.button_down(*button))
                        .collect();
                    events.push(InputEvent::PointerMove {
                        location: self.locate(pos),
                        held_buttons,
                    });
                }
                self.last_pointer_pos = Some(pos);
            } else if let Some(last) = self.last_pointer_pos.take() {
                events.push(InputEvent::PointerLeave {
                    last_known_location: self.locate(last),
                });
            }

            let pointer_pos = input.pointer.interact_pos().or(self.last_pointer_pos);
            for button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                let Some(pos) = pointer_pos else { break };
                if input.pointer.button_pressed(button) {
                    events.push(InputEvent::PointerDown {
                        location: self.locate(pos),
                        button,
                    });
                }
                if input.pointer.button_released(button) {
                    events.push(InputEvent::PointerUp {
                        location: self.locate(pos),
                        button,
                    });
                }
            }

            if keyboard_free {
                for event in &input.raw.events {
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } = event
                    {
                        events.push(InputEvent::KeyDown {
                            key: *key,
                            modifiers: *modifiers,
                        });
                    }
                }
            }
        });

        events
    }
}
