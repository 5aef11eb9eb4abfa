//! Wheel state and core simulation types
//!
//! Everything the spin state machine and the conveyor mutate lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::Prize;
use super::ring::{SlotGeometry, SlotRecycler};

/// Current phase of the spin state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpinPhase {
    /// Cruising, accepts spin requests
    #[default]
    Idle,
    /// Decelerating along the spin curve
    Spinning,
    /// Stopped, short pause before the snap
    Settling,
    /// Easing the nearest slot onto the exact center
    Snapping,
    /// Prize emitted, waiting for acknowledgement
    Resolved,
}

impl SpinPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpinPhase::Idle => "Idle",
            SpinPhase::Spinning => "Spinning",
            SpinPhase::Settling => "Settling",
            SpinPhase::Snapping => "Snapping",
            SpinPhase::Resolved => "Resolved",
        }
    }
}

/// The spin in flight. Prize and landing slot are committed together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSpin {
    /// Real prize drawn at spin start
    pub prize: Prize,
    /// Stable id of the slot that will end on the center
    pub landing_slot: u32,
    /// Randomized total scroll distance for the ramp
    pub distance: f64,
    /// Distance covered so far during the ramp
    pub travelled: f64,
    /// Normalizes the floored ramp curve to `distance`
    pub ramp_scale: f64,
    /// Signed correction measured when the snap began
    pub snap_residual: f64,
    /// Portion of the correction already applied
    pub snap_applied: f64,
}

/// Emitted by the simulation, drained by the owner each frame
#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    /// A spin began with this committed prize
    SpinStarted { prize_id: String, landing_slot: u32 },
    /// The centered slot's prize, exactly once per completed spin
    PrizeResolved(Prize),
    /// Snap found no slot; spin abandoned without payout
    SpinAborted,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete wheel state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelState {
    /// Seed the wheel's RNG was created from
    pub rng_state: RngState,
    /// Frame counter
    pub time_ticks: u64,
    /// Current phase
    pub phase: SpinPhase,
    /// Frames spent in the current phase
    pub phase_ticks: u32,
    /// Conveyor speed in units per frame
    pub scroll_speed: f64,
    /// Absolute distance scrolled since construction
    pub total_scrolled: f64,
    /// The slot strip
    pub ring: SlotRecycler,
    /// Spin in flight (set from start until acknowledgement)
    pub pending: Option<PendingSpin>,
    /// Completed spins
    pub spins_resolved: u64,
    /// Outbound events for this frame
    #[serde(skip)]
    pub events: Vec<WheelEvent>,
}

impl WheelState {
    pub fn new(seed: u64, ring_size: usize, geometry: SlotGeometry, idle_speed: f64) -> Self {
        Self {
            rng_state: RngState::new(seed),
            time_ticks: 0,
            phase: SpinPhase::Idle,
            phase_ticks: 0,
            scroll_speed: idle_speed,
            total_scrolled: 0.0,
            ring: SlotRecycler::new(ring_size, geometry),
            pending: None,
            spins_resolved: 0,
            events: Vec::new(),
        }
    }

    /// Move to a new phase and restart its frame counter
    pub fn enter(&mut self, phase: SpinPhase) {
        log::debug!("Wheel phase {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        self.phase_ticks = 0;
    }

    /// True from spin start until the resolution is emitted
    pub fn spinning(&self) -> bool {
        matches!(
            self.phase,
            SpinPhase::Spinning | SpinPhase::Settling | SpinPhase::Snapping
        )
    }

    pub fn pending_prize(&self) -> Option<&Prize> {
        self.pending.as_ref().map(|p| &p.prize)
    }

    pub fn landing_slot_index(&self) -> Option<u32> {
        self.pending.as_ref().map(|p| p.landing_slot)
    }

    /// Local offset within the lead slot's pitch
    pub fn scroll_offset(&self) -> f64 {
        self.ring.offset()
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<WheelEvent> {
        std::mem::take(&mut self.events)
    }
}
