//! System-level modules
//!
//! - Logging initialization
//! - Clock abstraction used by the mapping store

pub mod clock;
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
