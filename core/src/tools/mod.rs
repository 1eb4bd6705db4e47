pub mod render;
pub mod types;

pub use render::{render, render_failure, Rendering};
pub use types::*;
