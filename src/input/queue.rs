//! FIFO of translated events waiting for the application

use std::collections::VecDeque;

use crate::input::event::{Event, EventKind};
use crate::window::WindowId;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn peek(&self) -> Option<&Event> {
        self.events.front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether any queued event still names `window`, either as target or
    /// as the new owner in a grab-broken notice
    pub fn references(&self, window: WindowId) -> bool {
        self.events.iter().any(|event| {
            event.window == window
                || matches!(
                    event.kind,
                    EventKind::GrabBroken { grab_window: Some(w), .. } if w == window
                )
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
