//! Core traits and types for machine-cycle emulation.
//!
//! Components advance in machine cycles derived from a single master
//! crystal. State is inspected through [`Observable`], and completed video
//! frames leave the core through the latest-value channel in [`frame`].

mod clock;
pub mod frame;
mod observable;
mod tickable;

pub use clock::MasterClock;
pub use observable::{Observable, Value, parse_address};
pub use tickable::Tickable;
