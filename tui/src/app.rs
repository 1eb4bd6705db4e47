use anyhow::Result;
use crossterm::event;
use lisbeth_core::{AppEvent, Dispatcher};
use ratatui::{backend::Backend, Frame, Terminal};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    components::{ChatComponent, CommandPaletteComponent, InputComponent, StatusComponent},
    handlers::{EventHandler, InputHandler},
    state::AppState,
    utils::{layout, terminal},
};

/// Main application
pub struct App {
    state: AppState,
}

impl App {
    /// Create a new application instance
    pub fn new(dispatcher: Dispatcher, event_receiver: mpsc::UnboundedReceiver<AppEvent>) -> Self {
        Self {
            state: AppState::new(dispatcher, event_receiver),
        }
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = terminal::setup()?;

        info!("TUI initialized, starting main loop");
        let result = self.run_app(&mut terminal).await;

        // Restore terminal even when the loop failed
        terminal::restore(&mut terminal)?;

        let abandoned = self.state.dispatcher.cancel_in_flight();
        if abandoned > 0 {
            info!("Cancelled {} request(s) on exit", abandoned);
        }
        result
    }

    /// Main application loop
    async fn run_app<B: Backend + std::io::Write>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.state.update_cursor_blink();

            terminal.draw(|f| self.ui(f))?;

            tokio::select! {
                // Terminal events (keyboard, mouse, paste)
                terminal_event = async {
                    if event::poll(Duration::from_millis(0)).unwrap_or(false) {
                        event::read().ok()
                    } else {
                        None
                    }
                } => {
                    if let Some(event) = terminal_event {
                        InputHandler::handle_event(&mut self.state, event);
                    }
                },

                // Settled dispatches and due navigations
                app_event = self.state.event_receiver.recv() => {
                    if let Some(event) = app_event {
                        EventHandler::handle_event(&mut self.state, event);
                    }
                },

                // Timeout to ensure regular UI updates
                _ = tokio::time::sleep(Duration::from_millis(50)) => {},
            }

            if self.state.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Draw the user interface
    fn ui(&mut self, f: &mut Frame) {
        let chunks = layout::create_main_layout(f.size());

        ChatComponent::render(&mut self.state, f, chunks[0]);
        InputComponent::render(&mut self.state, f, chunks[1]);
        StatusComponent::render(&self.state, f, chunks[2]);

        // Command palette overlay (render on top)
        if self.state.command_palette_open {
            CommandPaletteComponent::render(&self.state, f);
        }
    }
}
