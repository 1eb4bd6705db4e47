// UI components for the TUI

pub mod chat;
pub mod command_palette;
pub mod input;
pub mod status;

pub use chat::ChatComponent;
pub use command_palette::CommandPaletteComponent;
pub use input::InputComponent;
pub use status::StatusComponent;
