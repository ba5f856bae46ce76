//! Periodic notice synchronization.
//!
//! - `diff`: detect notices not previously seen
//! - `poller`: the fixed-interval cycle across channel bindings

pub mod diff;
mod poller;

pub use poller::{Poller, TickSummary};
