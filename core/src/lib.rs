pub mod backend;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod identity;
pub mod masking;
pub mod navigation;
pub mod tools;
pub mod transcript;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use backend::{Backend, BackendError, BackendFactory, BackendInfo, HttpBackend, MockBackend};
pub use command::{classify, Command, UsageError};
pub use config::{Config, ConfigError};
pub use dispatcher::{DispatchPhase, Dispatcher, SubmitOutcome};
pub use events::{AppEvent, EventBus, EventSender};
pub use identity::{FileStore, MemoryStore, SessionIdentity, SessionStore, StoreError};
pub use masking::{display_line, mask_secret, EchoMode, Mirror};
pub use navigation::{DisabledNavigator, NavigationError, Navigator, SystemNavigator};
pub use tools::{ToolKind, ToolRequest, ToolResult};
pub use transcript::{Author, Block, Entry, EntryId, Inline, Tile, Transcript};
