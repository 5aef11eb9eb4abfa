//! Platform abstraction layer
//!
//! Turns wall-clock or virtual time into fixed simulation frames.

pub mod time;

pub use time::{Clock, FrameClock, SystemClock, VirtualClock};
