//! Conversion kernel: a synchronous state machine stepped by an async driver.
//!
//! Nothing under this module awaits, sleeps or touches the host. Time only
//! moves when the caller passes a later `Millis`, so every timer is
//! deterministic under test. History timestamps come from an injectable
//! wall clock (`ConversionSession::with_wall_clock`).

pub mod cancel;
pub mod effect;
pub mod event;
pub mod progress;
pub mod reactor;
pub mod session;
pub mod time;
