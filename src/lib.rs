//! Reward Wheel - a conveyor-strip prize wheel engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (catalog, samplers, slot ring, spin state machine)
//! - `wheel`: Owning facade with the inbound spin/acknowledge operations
//! - `present`: Outbound collaborator traits (presentation, resolution)
//! - `ledger`: Reference wallet collaborator (currency, inventory, toasts)
//! - `platform`: Frame timing (fixed-step accumulator, virtual clock)
//! - `settings`: Construction-time tuning

pub mod error;
pub mod ledger;
pub mod platform;
pub mod present;
pub mod settings;
pub mod sim;
pub mod wheel;

pub use error::WheelError;
pub use ledger::Wallet;
pub use present::{NullPresenter, ResolutionSink, SlotPresenter};
pub use settings::{TimingPreset, WheelSettings};
pub use wheel::Wheel;

/// Engine configuration constants
pub mod consts {
    /// Fixed frame duration in milliseconds (60 Hz, one conveyor step per frame)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Slots in the ring
    pub const RING_SIZE: usize = 12;
    /// Slot body width
    pub const SLOT_WIDTH: f64 = 150.0;
    /// Gap between neighbouring slots
    pub const SLOT_GAP: f64 = 18.0;
    /// Visible strip width (five slot pitches)
    pub const VIEWPORT_WIDTH: f64 = 840.0;

    /// Idle cruise speed (units per frame)
    pub const IDLE_SPEED: f64 = 1.0;
    /// Deceleration floor so the strip never stalls before the explicit stop
    pub const MIN_SPEED: f64 = 0.5;
    /// Upper bound for the peak spin speed (units per frame)
    pub const MAX_SPEED: f64 = 60.0;

    /// Randomized spin distance range
    pub const SPIN_DISTANCE_MIN: f64 = 3000.0;
    pub const SPIN_DISTANCE_MAX: f64 = 4000.0;

    /// Phase durations (ms)
    pub const RAMP_MS: f64 = 5000.0;
    pub const PAUSE_MS: f64 = 300.0;
    pub const SNAP_MS: f64 = 400.0;

    /// Emphasis scale bounds
    pub const MIN_SCALE: f32 = 0.6;
    pub const MAX_SCALE: f32 = 1.5;

    /// Catalog weights must sum to this (percent)
    pub const WEIGHT_TOTAL: f64 = 100.0;
    pub const WEIGHT_TOLERANCE: f64 = 1e-6;
}

/// Ease-out quart: fast start, long tail
#[inline]
pub fn ease_out_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

/// Ease-out cubic
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Convert a duration in milliseconds to whole frames
#[inline]
pub fn ms_to_ticks(ms: f64) -> u32 {
    (ms / consts::FRAME_MS).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_out_quart(0.0), 0.0);
        assert_eq!(ease_out_quart(1.0), 1.0);
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        // Clamped outside [0, 1]
        assert_eq!(ease_out_quart(1.5), 1.0);
        assert_eq!(ease_out_cubic(-0.5), 0.0);
    }

    #[test]
    fn test_ease_out_front_loaded() {
        // Ease-out covers most of the distance early
        assert!(ease_out_quart(0.5) > 0.9);
        assert!(ease_out_cubic(0.5) > 0.85);
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(5000.0), 300);
        assert_eq!(ms_to_ticks(400.0), 24);
        assert_eq!(ms_to_ticks(0.0), 0);
    }
}
