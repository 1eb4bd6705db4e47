//! Terminal front end for Lisbeth: app loop, state, input handling and components.

pub mod app;
pub mod components;
pub mod handlers;
pub mod state;
pub mod utils;

// Re-export main types for convenience
pub use app::App;
pub use state::AppState;
