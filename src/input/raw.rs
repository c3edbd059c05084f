//! Low-level input collection: crossterm polling, pointer gesture tracking, and translation
//! into primitive events that the higher-level input service can consume.

use crate::error::Result;
use crate::input::gesture::{GestureConfig, GestureSample, GestureTracker};
use ratatui::crossterm::event::{self, Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Poll timeout used when the caller does not provide one.
const DEFAULT_POLL_TIMEOUT_MS: u64 = 50;

/// Low-level events surfaced by the raw input collector.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Key(KeyEvent),
    Fling(GestureSample),
    Focus { gained: bool },
    Resize { width: u16, height: u16 },
}

/// Collector that polls crossterm for events and recognises pointer flings.
#[derive(Debug)]
pub struct RawInputCollector {
    tracker: GestureTracker,
    pending_events: VecDeque<RawInputEvent>,
}

impl RawInputCollector {
    pub fn new() -> Self {
        Self::with_gesture_config(GestureConfig::default())
    }

    pub fn with_gesture_config(config: GestureConfig) -> Self {
        Self {
            tracker: GestureTracker::new(config),
            pending_events: VecDeque::new(),
        }
    }

    /// Check whether the collector has no pending events and no gesture in progress.
    pub fn is_idle(&self) -> bool {
        self.pending_events.is_empty() && !self.tracker.is_active()
    }

    /// Process a synthetic event (primarily used by unit tests).
    pub fn process_event(&mut self, event: Event) {
        self.enqueue_event(event, Instant::now());
    }

    /// Process a synthetic event with an explicit timestamp.
    pub fn process_event_at(&mut self, event: Event, now: Instant) {
        self.enqueue_event(event, now);
    }

    /// Retrieve the next raw input event, blocking up to `timeout`.
    pub fn poll_event(&mut self, timeout: Option<Duration>) -> Result<Option<RawInputEvent>> {
        if let Some(event) = self.pop_pending() {
            return Ok(Some(event));
        }

        let poll_timeout = timeout.unwrap_or(Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS));
        if !event::poll(poll_timeout)? {
            return Ok(None);
        }

        let event = event::read()?;
        self.enqueue_event(event, Instant::now());
        Ok(self.pop_pending())
    }

    fn enqueue_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key_event) => {
                self.pending_events.push_back(RawInputEvent::Key(key_event));
            }
            Event::Resize(width, height) => {
                self.tracker.cancel();
                self.pending_events
                    .push_back(RawInputEvent::Resize { width, height });
            }
            Event::FocusGained => {
                self.pending_events
                    .push_back(RawInputEvent::Focus { gained: true });
            }
            Event::FocusLost => {
                self.tracker.cancel();
                self.pending_events
                    .push_back(RawInputEvent::Focus { gained: false });
            }
            Event::Mouse(mouse_event) => {
                if let Some(fling) = self.handle_mouse_event(mouse_event, now) {
                    self.pending_events.push_back(fling);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent, now: Instant) -> Option<RawInputEvent> {
        let MouseEvent {
            kind, column, row, ..
        } = mouse_event;
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.tracker.pointer_down(column, row, now);
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.tracker.pointer_move(column, row, now);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => self
                .tracker
                .pointer_up(column, row, now)
                .map(RawInputEvent::Fling),
            _ => None,
        }
    }

    /// Pop the next pending raw event.
    pub fn pop_pending(&mut self) -> Option<RawInputEvent> {
        self.pending_events.pop_front()
    }
}

impl Default for RawInputCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Direction;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn left_drag_release_emits_fling() {
        let mut collector = RawInputCollector::new();
        let t0 = Instant::now();

        collector.process_event_at(mouse(MouseEventKind::Down(MouseButton::Left), 40, 10), t0);
        collector.process_event_at(
            mouse(MouseEventKind::Drag(MouseButton::Left), 30, 10),
            t0 + Duration::from_millis(20),
        );
        assert!(!collector.is_idle());
        collector.process_event_at(
            mouse(MouseEventKind::Up(MouseButton::Left), 20, 11),
            t0 + Duration::from_millis(40),
        );

        match collector.pop_pending() {
            Some(RawInputEvent::Fling(sample)) => {
                assert_eq!(sample.direction(), Direction::Left);
            }
            other => panic!("expected fling, got {other:?}"),
        }
        assert!(collector.is_idle());
    }

    #[test]
    fn right_button_and_plain_clicks_are_ignored() {
        let mut collector = RawInputCollector::new();
        let t0 = Instant::now();

        collector.process_event_at(mouse(MouseEventKind::Down(MouseButton::Right), 0, 0), t0);
        collector.process_event_at(
            mouse(MouseEventKind::Up(MouseButton::Right), 30, 0),
            t0 + Duration::from_millis(10),
        );
        collector.process_event_at(mouse(MouseEventKind::Down(MouseButton::Left), 5, 5), t0);
        collector.process_event_at(
            mouse(MouseEventKind::Up(MouseButton::Left), 5, 5),
            t0 + Duration::from_millis(10),
        );

        assert_eq!(collector.pop_pending(), None);
    }

    #[test]
    fn focus_loss_cancels_gesture_and_is_queued_in_order() {
        let mut collector = RawInputCollector::new();
        let t0 = Instant::now();

        collector.process_event_at(mouse(MouseEventKind::Down(MouseButton::Left), 40, 10), t0);
        collector.process_event_at(Event::FocusLost, t0 + Duration::from_millis(5));
        collector.process_event_at(
            mouse(MouseEventKind::Up(MouseButton::Left), 10, 10),
            t0 + Duration::from_millis(20),
        );
        collector.process_event(Event::FocusGained);
        collector.process_event(Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)));

        assert_eq!(
            collector.pop_pending(),
            Some(RawInputEvent::Focus { gained: false })
        );
        assert_eq!(
            collector.pop_pending(),
            Some(RawInputEvent::Focus { gained: true })
        );
        assert!(matches!(
            collector.pop_pending(),
            Some(RawInputEvent::Key(key)) if key.code == KeyCode::Left
        ));
        assert_eq!(collector.pop_pending(), None);
    }
}
