//! High-level input service.
//!
//! Consumes raw events, runs the play/dialog input state machine, and yields domain-level
//! `InputAction`s that the game loop consumes.

use crate::engine::EngineCommand;
use crate::error::Result;
use crate::input::gesture::{GestureConfig, GestureSample};
use crate::input::raw::{RawInputCollector, RawInputEvent};
use log::error;
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Current input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Playing,
    Dialog,
}

/// User-invocable menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Restart,
    MapPrevious,
    MapNext,
    About,
}

impl MenuCommand {
    /// Engine command behind this entry; `About` is handled by the host.
    pub fn engine_command(self) -> Option<EngineCommand> {
        match self {
            MenuCommand::Restart => Some(EngineCommand::Restart),
            MenuCommand::MapPrevious => Some(EngineCommand::MapPrevious),
            MenuCommand::MapNext => Some(EngineCommand::MapNext),
            MenuCommand::About => None,
        }
    }

    /// Key shown next to the entry in the menu bar.
    pub fn hotkey(self) -> char {
        match self {
            MenuCommand::Restart => 'r',
            MenuCommand::MapPrevious => 'p',
            MenuCommand::MapNext => 'n',
            MenuCommand::About => 'a',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuCommand::Restart => "Restart",
            MenuCommand::MapPrevious => "Previous",
            MenuCommand::MapNext => "Next",
            MenuCommand::About => "About",
        }
    }

    pub const ALL: [MenuCommand; 4] = [
        MenuCommand::MapPrevious,
        MenuCommand::Restart,
        MenuCommand::MapNext,
        MenuCommand::About,
    ];
}

/// High-level input actions emitted by the state machine/service.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    /// A recognised pointer fling.
    Fling(GestureSample),
    /// A key not bound to a menu entry; the gesture resolver decides whether it rolls.
    Key(KeyCode),
    Menu(MenuCommand),
    DismissDialog,
    FocusGained,
    FocusLost,
    Resize {
        width: u16,
        height: u16,
    },
    Quit,
    NoAction,
}

/// State machine that maps keys to game actions and tracks the about dialog.
pub struct InputStateMachine {
    state: InputState,
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self {
            state: InputState::Playing,
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputAction {
        if key_event.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }

        let plain = !key_event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match (self.state, key_event.code) {
            (_, KeyCode::Char('c')) if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                InputAction::Quit
            }
            (InputState::Dialog, _) => {
                self.state = InputState::Playing;
                InputAction::DismissDialog
            }
            (InputState::Playing, KeyCode::Char('q')) if plain => InputAction::Quit,
            (InputState::Playing, KeyCode::Char('r')) if plain => {
                InputAction::Menu(MenuCommand::Restart)
            }
            (InputState::Playing, KeyCode::Char('p')) if plain => {
                InputAction::Menu(MenuCommand::MapPrevious)
            }
            (InputState::Playing, KeyCode::Char('n')) if plain => {
                InputAction::Menu(MenuCommand::MapNext)
            }
            (InputState::Playing, KeyCode::Char('a') | KeyCode::Char('?')) if plain => {
                self.state = InputState::Dialog;
                InputAction::Menu(MenuCommand::About)
            }
            (InputState::Playing, code) => InputAction::Key(code),
        }
    }

    /// A fling while the dialog is open cancels the dialog instead of rolling.
    pub fn handle_fling(&mut self, sample: GestureSample) -> InputAction {
        match self.state {
            InputState::Playing => InputAction::Fling(sample),
            InputState::Dialog => {
                self.state = InputState::Playing;
                InputAction::DismissDialog
            }
        }
    }

    pub fn get_state(&self) -> InputState {
        self.state
    }
}

impl Default for InputStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Service responsible for producing high-level `InputAction`s from terminal events.
pub struct InputService {
    state_machine: InputStateMachine,
    raw_input: RawInputCollector,
}

impl InputService {
    pub fn new() -> Self {
        Self::with_gesture_config(GestureConfig::default())
    }

    pub fn with_gesture_config(config: GestureConfig) -> Self {
        Self {
            state_machine: InputStateMachine::new(),
            raw_input: RawInputCollector::with_gesture_config(config),
        }
    }

    pub fn poll_actions(&mut self, timeout: Option<Duration>) -> Result<Vec<InputAction>> {
        let mut actions = Vec::new();

        if let Some(raw_event) = self.raw_input.poll_event(timeout)? {
            if let Some(action) = self.process_raw_event(raw_event) {
                actions.push(action);
            }

            while let Some(extra_event) = self.raw_input.pop_pending() {
                if let Some(action) = self.process_raw_event(extra_event) {
                    actions.push(action);
                }
            }
        }

        Ok(actions)
    }

    pub fn process_event(&mut self, event: Event) -> Vec<InputAction> {
        let mut actions = Vec::new();
        self.raw_input.process_event(event);
        while let Some(raw_event) = self.raw_input.pop_pending() {
            if let Some(action) = self.process_raw_event(raw_event) {
                actions.push(action);
            }
        }
        actions
    }

    fn process_raw_event(&mut self, event: RawInputEvent) -> Option<InputAction> {
        let action = match event {
            RawInputEvent::Key(key_event) => self.state_machine.handle_key_event(key_event),
            RawInputEvent::Fling(sample) => self.state_machine.handle_fling(sample),
            RawInputEvent::Focus { gained: true } => InputAction::FocusGained,
            RawInputEvent::Focus { gained: false } => InputAction::FocusLost,
            RawInputEvent::Resize { width, height } => InputAction::Resize { width, height },
        };

        match action {
            InputAction::NoAction => None,
            _ => Some(action),
        }
    }
}

impl Default for InputService {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a blocking thread that polls for terminal events and forwards actions to the game loop.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputAction>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
    gesture: GestureConfig,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut service = InputService::with_gesture_config(gesture);
        while !shutdown.load(Ordering::SeqCst) {
            match service.poll_actions(Some(poll_interval)) {
                Ok(actions) => {
                    for action in actions {
                        if tx.send(action).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    error!("input thread error: {}", err);
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEventState, MouseButton, MouseEvent, MouseEventKind};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row: 5,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn menu_keys_map_to_commands() {
        let mut service = InputService::new();
        assert_eq!(
            service.process_event(key(KeyCode::Char('r'))),
            vec![InputAction::Menu(MenuCommand::Restart)]
        );
        assert_eq!(
            service.process_event(key(KeyCode::Char('p'))),
            vec![InputAction::Menu(MenuCommand::MapPrevious)]
        );
        assert_eq!(
            service.process_event(key(KeyCode::Char('n'))),
            vec![InputAction::Menu(MenuCommand::MapNext)]
        );
        assert_eq!(
            service.process_event(key(KeyCode::Char('q'))),
            vec![InputAction::Quit]
        );
    }

    #[test]
    fn other_keys_pass_through_for_resolution() {
        let mut service = InputService::new();
        assert_eq!(
            service.process_event(key(KeyCode::Left)),
            vec![InputAction::Key(KeyCode::Left)]
        );
        assert_eq!(
            service.process_event(key(KeyCode::Char('z'))),
            vec![InputAction::Key(KeyCode::Char('z'))]
        );
    }

    #[test]
    fn key_release_is_dropped() {
        let mut service = InputService::new();
        let release = KeyEvent {
            code: KeyCode::Left,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(service.process_event(Event::Key(release)).is_empty());
    }

    #[test]
    fn about_dialog_swallows_next_key() {
        let mut sm = InputStateMachine::new();
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
            InputAction::Menu(MenuCommand::About)
        );
        assert_eq!(sm.get_state(), InputState::Dialog);
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)),
            InputAction::DismissDialog
        );
        assert_eq!(sm.get_state(), InputState::Playing);
    }

    #[test]
    fn fling_cancels_open_dialog() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE));
        assert_eq!(
            sm.handle_fling(GestureSample::new(100.0, 0.0)),
            InputAction::DismissDialog
        );
        assert_eq!(
            sm.handle_fling(GestureSample::new(100.0, 0.0)),
            InputAction::Fling(GestureSample::new(100.0, 0.0))
        );
    }

    #[test]
    fn ctrl_c_quits_from_any_state() {
        let mut sm = InputStateMachine::new();
        sm.handle_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(
            sm.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputAction::Quit
        );
    }

    #[test]
    fn focus_and_pointer_events_preserve_order() {
        let mut service = InputService::new();
        assert!(service
            .process_event(mouse(MouseEventKind::Down(MouseButton::Left), 10))
            .is_empty());
        assert_eq!(
            service.process_event(Event::FocusLost),
            vec![InputAction::FocusLost]
        );
        assert_eq!(
            service.process_event(Event::FocusGained),
            vec![InputAction::FocusGained]
        );
        assert_eq!(
            service.process_event(Event::Resize(100, 30)),
            vec![InputAction::Resize {
                width: 100,
                height: 30
            }]
        );
    }
}
