//! timeline-rs: a horizontally scrollable calendar timeline engine.
//!
//! The crate tiles a date range into labeled blocks at Hour/Day/Week
//! resolution, keeps block boundaries aligned across daylight-saving
//! transitions, maps blocks to pixel or percentage widths and back, and
//! maintains a bounded, reused slot pool so multi-year ranges never cost one
//! render element per leaf unit. It is headless: hosts paint the produced
//! rows and slots with whatever toolkit they use.

pub mod api;
pub mod core;
pub mod error;
pub mod locale;
pub mod render;
pub mod telemetry;

pub use api::{TimelineConfig, TimelineEngine};
pub use error::{TimelineError, TimelineResult};
