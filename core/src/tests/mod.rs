pub mod classifier_tests;
pub mod dispatcher_tests;

// Test utilities
use crate::backend::Backend;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::events::{AppEvent, EventBus, EventSender};
use crate::identity::MemoryStore;
use crate::navigation::{NavigationError, Navigator};
use crate::transcript::EntryId;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Test helper to setup an event bus for testing
pub fn setup_event_bus() -> (EventSender, mpsc::UnboundedReceiver<AppEvent>) {
    let bus = EventBus::new();
    let sender = bus.sender();
    let receiver = bus.into_receiver();
    (sender, receiver)
}

/// Config with short delays so tests run quickly
pub fn test_config() -> Config {
    Config {
        request_timeout: Duration::from_secs(5),
        navigation_delay: Duration::from_millis(10),
        ..Config::default()
    }
}

/// Navigator that records every link instead of opening it
#[derive(Default)]
pub struct RecordingNavigator {
    pub opened: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNavigator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open(&self, url: &str) -> Result<(), NavigationError> {
        self.opened.lock().unwrap().push(url.to_string());
        if self.fail {
            Err(NavigationError::Failed("no browser".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Test helper to build a dispatcher over an in-memory store
pub fn setup_dispatcher(
    backend: Arc<dyn Backend>,
    navigator: Arc<dyn Navigator>,
    config: &Config,
) -> (Dispatcher, mpsc::UnboundedReceiver<AppEvent>) {
    let (sender, receiver) = setup_event_bus();
    let dispatcher = Dispatcher::new(backend, Box::new(MemoryStore::new()), navigator, sender, config);
    (dispatcher, receiver)
}

/// Test helper to wait for the next event, failing the test after a few seconds
pub async fn next_event(receiver: &mut mpsc::UnboundedReceiver<AppEvent>) -> AppEvent {
    tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event bus closed")
}

/// Test helper to pump events into the dispatcher until one dispatch settles
pub async fn settle_next(
    dispatcher: &mut Dispatcher,
    receiver: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> EntryId {
    loop {
        match next_event(receiver).await {
            AppEvent::DispatchSettled { entry, outcome } => {
                dispatcher.settle(entry, outcome);
                return entry;
            }
            AppEvent::Navigate { entry, url } => dispatcher.navigate(entry, &url),
            AppEvent::Quit => panic!("unexpected quit"),
        }
    }
}

/// Test helper to pump events until the next navigation has been handled
pub async fn navigate_next(
    dispatcher: &mut Dispatcher,
    receiver: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> (EntryId, String) {
    loop {
        match next_event(receiver).await {
            AppEvent::Navigate { entry, url } => {
                dispatcher.navigate(entry, &url);
                return (entry, url);
            }
            AppEvent::DispatchSettled { entry, outcome } => dispatcher.settle(entry, outcome),
            AppEvent::Quit => panic!("unexpected quit"),
        }
    }
}
