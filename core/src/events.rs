use crate::backend::BackendError;
use crate::tools::ToolResult;
use crate::transcript::EntryId;
use tokio::sync::mpsc;

/// Events that flow back to the UI task
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The outbound call for a placeholder settled
    DispatchSettled {
        entry: EntryId,
        outcome: Result<ToolResult, BackendError>,
    },

    /// The navigation delay for a link rendered in `entry` elapsed
    Navigate { entry: EntryId, url: String },

    /// Application should quit
    Quit,
}

/// Event bus for communication between components
#[derive(Debug)]
pub struct EventBus {
    sender: mpsc::UnboundedSender<AppEvent>,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Get a sender handle for the event bus
    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: self.sender.clone(),
        }
    }

    /// Get the receiver (should only be used by the main event loop)
    pub fn into_receiver(self) -> mpsc::UnboundedReceiver<AppEvent> {
        self.receiver
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for sending events to the event bus
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    /// Send an event to the bus
    pub fn send(&self, event: AppEvent) -> Result<(), EventSendError> {
        self.inner
            .send(event)
            .map_err(|_| EventSendError::ChannelClosed)
    }

    /// Report a settled dispatch
    pub fn send_settled(
        &self,
        entry: EntryId,
        outcome: Result<ToolResult, BackendError>,
    ) -> Result<(), EventSendError> {
        self.send(AppEvent::DispatchSettled { entry, outcome })
    }

    /// Send quit signal
    pub fn send_quit(&self) -> Result<(), EventSendError> {
        self.send(AppEvent::Quit)
    }
}

/// Errors that can occur when sending events
#[derive(Debug, thiserror::Error)]
pub enum EventSendError {
    #[error("Event channel is closed")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let mut receiver = bus.into_receiver();

        let entry = EntryId::new();
        sender
            .send_settled(entry, Err(BackendError::Cancelled))
            .unwrap();

        let event = receiver.recv().await.unwrap();
        match event {
            AppEvent::DispatchSettled { entry: got, outcome } => {
                assert_eq!(got, entry);
                assert_eq!(outcome, Err(BackendError::Cancelled));
            }
            _ => panic!("Expected DispatchSettled event"),
        }
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped() {
        let bus = EventBus::new();
        let sender = bus.sender();
        drop(bus.into_receiver());

        assert!(matches!(sender.send_quit(), Err(EventSendError::ChannelClosed)));
    }
}
