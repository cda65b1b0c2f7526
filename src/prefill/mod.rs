//! Prefill: fetch prior submission data, apply it, verify it after the first render.

mod coordinator;

pub(crate) use coordinator::apply_data;
pub use coordinator::{PrefillCoordinator, PrefillRecord};
