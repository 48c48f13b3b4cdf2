use crate::track::Track;
use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,

    /// The track list finished a pagination pass
    PaginationChanged,

    /// A track was picked in the list, carries its id
    TrackRequested(String),

    /// The track catalogue arrived
    CatalogueLoaded(Vec<Value>),

    /// A single track arrived
    TrackLoaded(Track),

    /// Loading the catalogue or a track failed
    LoadFailed(String),
}

/// Event handler for managing input events
pub struct EventHandler {
    /// Event receiver channel
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,

    /// Tick interval for periodic events
    tick_interval: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let tick_interval = Duration::from_millis(100); // 10 FPS

        Self {
            receiver,
            sender,
            tick_interval,
        }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Result<Event> {
        // Internal events first so loads and pagination updates are not starved
        if let Ok(event) = self.receiver.try_recv() {
            return Ok(event);
        }

        let tick = self.tick_interval;
        let polled = tokio::task::spawn_blocking(move || -> std::io::Result<Option<CrosstermEvent>> {
            if crossterm::event::poll(tick)? {
                Ok(Some(crossterm::event::read()?))
            } else {
                Ok(None)
            }
        })
        .await??;

        if let Some(event) = polled.and_then(Self::convert_crossterm_event) {
            return Ok(event);
        }

        if let Ok(event) = self.receiver.try_recv() {
            return Ok(event);
        }

        // Return tick event if no other events
        Ok(Event::Tick)
    }

    /// Convert crossterm events to application events
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                Some(Event::Key(key_event))
            }
            CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            _ => None,
        }
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_internal_events_come_first() {
        let mut handler = EventHandler::new();
        handler.sender().send(Event::PaginationChanged).unwrap();

        let event = handler.next().await.unwrap();
        assert!(matches!(event, Event::PaginationChanged));
    }

    #[test]
    fn test_conversion_drops_key_release() {
        use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

        let release = KeyEvent {
            code: KeyCode::Char('n'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(EventHandler::convert_crossterm_event(CrosstermEvent::Key(release)).is_none());
        assert!(matches!(
            EventHandler::convert_crossterm_event(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        ));
    }
}
