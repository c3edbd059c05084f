//! Lifecycle coordination between the host's visibility changes and the engine.
//!
//! The coordinator is the only writer of the engine's listener subscription: listeners are
//! registered while the game is in the foreground and unregistered otherwise. Checkpoints
//! capture the live engine state before listeners are torn down. Restores are delivered
//! as-is; the engine replaces its state, so repeating one is harmless.

use crate::engine::{Engine, LifecycleSnapshot};
use crate::error::{Result, TiltMazeError};
use log::{debug, info, warn};

/// Visibility state of the hosting application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Foreground,
    Background,
    Destroyed,
}

/// Drives engine subscriptions and snapshots through the host lifecycle.
#[derive(Debug)]
pub struct LifecycleCoordinator {
    state: LifecycleState,
    subscribed: bool,
}

impl LifecycleCoordinator {
    /// Create the coordinator for a freshly constructed engine, restoring `saved` into it
    /// when the previous process left a snapshot behind.
    pub fn create<E: Engine + ?Sized>(engine: &mut E, saved: Option<&LifecycleSnapshot>) -> Self {
        if saved.is_some() {
            info!("restoring saved game on create");
        }
        engine.restore_state(saved);
        Self {
            state: LifecycleState::Created,
            subscribed: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the engine's listeners are currently registered.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// The game became visible.
    pub fn resume<E: Engine + ?Sized>(&mut self, engine: &mut E) -> Result<()> {
        self.ensure_live("resume")?;
        if self.state == LifecycleState::Foreground {
            debug!("resume while already in foreground");
        }
        self.subscribe(engine);
        self.transition(LifecycleState::Foreground);
        Ok(())
    }

    /// The game lost visibility. Listeners are always unregistered.
    pub fn pause<E: Engine + ?Sized>(&mut self, engine: &mut E) -> Result<()> {
        self.ensure_live("pause")?;
        self.unsubscribe(engine);
        if self.state == LifecycleState::Foreground {
            self.transition(LifecycleState::Background);
        } else {
            debug!("pause in {:?} leaves state unchanged", self.state);
        }
        Ok(())
    }

    /// Capture a snapshot of the live engine, then unregister listeners.
    ///
    /// A checkpoint taken in the foreground also moves the game to the background, since the
    /// engine no longer receives callbacks.
    pub fn checkpoint<E: Engine + ?Sized>(&mut self, engine: &mut E) -> Result<LifecycleSnapshot> {
        self.ensure_live("checkpoint")?;
        let snapshot = engine.save_state();
        self.unsubscribe(engine);
        if self.state == LifecycleState::Foreground {
            self.transition(LifecycleState::Background);
        }
        debug!("checkpoint captured");
        Ok(snapshot)
    }

    /// Deliver a snapshot to the engine. `None` means nothing to restore.
    pub fn restore<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        snapshot: Option<&LifecycleSnapshot>,
    ) -> Result<()> {
        self.ensure_live("restore")?;
        engine.restore_state(snapshot);
        Ok(())
    }

    /// Enter the terminal state. Nothing is captured here; checkpoint before destroying.
    pub fn destroy<E: Engine + ?Sized>(&mut self, engine: &mut E) {
        if self.state == LifecycleState::Destroyed {
            return;
        }
        if self.subscribed {
            warn!("destroy while listeners are registered; unregistering");
            self.unsubscribe(engine);
        }
        self.transition(LifecycleState::Destroyed);
    }

    fn subscribe<E: Engine + ?Sized>(&mut self, engine: &mut E) {
        if !self.subscribed {
            engine.register_listener();
            self.subscribed = true;
        }
    }

    fn unsubscribe<E: Engine + ?Sized>(&mut self, engine: &mut E) {
        if self.subscribed {
            engine.unregister_listener();
            self.subscribed = false;
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        if self.state != next {
            debug!("lifecycle {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn ensure_live(&self, operation: &'static str) -> Result<()> {
        if self.state == LifecycleState::Destroyed {
            return Err(TiltMazeError::lifecycle(operation));
        }
        Ok(())
    }
}
