mod bus;
mod events;

pub use bus::EventQueue;
pub use events::SceneEvent;
