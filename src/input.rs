//! Input subsystem: raw terminal events, gesture recognition, and key/menu mapping.

pub mod gesture;
pub mod raw;
pub mod service;

// Public re-exports for convenience. Modules outside this crate should prefer importing
// from `crate::input` rather than reaching into submodules.
pub use gesture::{
    resolve_fling, resolve_key, GestureConfig, GestureResolver, GestureSample, GestureTracker,
};
pub use service::{
    spawn_input_thread, InputAction, InputService, InputState, InputStateMachine, MenuCommand,
};
