//! # Action gate
//!
//! The widget treats its public actions as contenders for **one** slot.
//! At any given time at most one of `load`, `submit`, `draft` holds it.
//! A request that finds the slot busy is dropped, never queued.
//!
//! ## Invariants
//! - `acquire` never blocks and never waits.
//! - `release` is idempotent.
//! - A [`GateGuard`] releases on drop, covering `?`, early returns and panics.

mod action;
mod lock;

pub use action::Action;
pub use lock::{BusyLock, Gate, GateGuard};
