use crate::state::AppState;
use lisbeth_core::AppEvent;
use tracing::debug;

/// Handles application events coming back from spawned tasks
pub struct EventHandler;

impl EventHandler {
    /// Handle application events
    pub fn handle_event(state: &mut AppState, event: AppEvent) {
        match event {
            AppEvent::DispatchSettled { entry, outcome } => {
                debug!("Dispatch {} settled (ok: {})", entry, outcome.is_ok());
                state.dispatcher.settle(entry, outcome);
                // Re-enable auto-scroll for new content
                state.auto_scroll_chat = true;
            }
            AppEvent::Navigate { entry, url } => {
                debug!("Navigation due for {}", entry);
                state.dispatcher.navigate(entry, &url);
            }
            AppEvent::Quit => {
                state.should_quit = true;
            }
        }
    }
}
