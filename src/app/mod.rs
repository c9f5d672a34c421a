//! Process-level wiring

pub mod console;
pub mod presenter;
pub mod state;

pub use state::AppState;
