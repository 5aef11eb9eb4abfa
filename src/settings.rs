//! Wheel settings
//!
//! Fixed at construction; nothing here is mutable while a wheel runs.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::WheelError;
use crate::ms_to_ticks;
use crate::sim::catalog::PrizeCatalog;
use crate::sim::conveyor::ConveyorAnimator;
use crate::sim::ring::SlotGeometry;
use crate::sim::selector::WeightedPrizeSelector;
use crate::sim::spin::SpinController;
use crate::sim::tick::WheelParts;
use crate::sim::visual::{VisualSampler, VisualTier, default_tiers};

/// Timing preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimingPreset {
    #[default]
    Normal,
    Turbo,
    /// Near-instant spins for tests and demos
    Instant,
}

impl TimingPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingPreset::Normal => "Normal",
            TimingPreset::Turbo => "Turbo",
            TimingPreset::Instant => "Instant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(TimingPreset::Normal),
            "turbo" | "fast" => Some(TimingPreset::Turbo),
            "instant" => Some(TimingPreset::Instant),
            _ => None,
        }
    }

    /// Deceleration duration (ms)
    pub fn ramp_ms(&self) -> f64 {
        match self {
            TimingPreset::Normal => RAMP_MS,
            TimingPreset::Turbo => 2500.0,
            TimingPreset::Instant => 100.0,
        }
    }

    /// Pause between stop and snap (ms)
    pub fn pause_ms(&self) -> f64 {
        match self {
            TimingPreset::Normal => PAUSE_MS,
            TimingPreset::Turbo => 150.0,
            TimingPreset::Instant => 0.0,
        }
    }

    /// Snap duration (ms)
    pub fn snap_ms(&self) -> f64 {
        match self {
            TimingPreset::Normal => SNAP_MS,
            TimingPreset::Turbo => 200.0,
            TimingPreset::Instant => 50.0,
        }
    }

    /// Peak speed allowance (units per frame)
    pub fn max_speed(&self) -> f64 {
        match self {
            TimingPreset::Normal => MAX_SPEED,
            TimingPreset::Turbo => 120.0,
            TimingPreset::Instant => 4000.0,
        }
    }
}

/// Wheel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    /// Timing preset the durations were taken from
    pub preset: TimingPreset,

    // === Ring ===
    /// Slots in the ring
    pub ring_size: usize,
    /// Slot body width
    pub slot_width: f64,
    /// Gap between slots
    pub slot_gap: f64,
    /// Visible strip width
    pub viewport_width: f64,

    // === Motion ===
    /// Idle cruise speed (units per frame)
    pub idle_speed: f64,
    /// Deceleration floor (units per frame)
    pub min_speed: f64,
    /// Peak spin speed allowance (units per frame)
    pub max_speed: f64,
    /// Spin distance range
    pub spin_distance_min: f64,
    pub spin_distance_max: f64,

    // === Timing ===
    pub ramp_ms: f64,
    pub pause_ms: f64,
    pub snap_ms: f64,

    // === Presentation ===
    /// Cosmetic sampling tiers
    pub visual_tiers: Vec<VisualTier>,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            preset: TimingPreset::Normal,

            ring_size: RING_SIZE,
            slot_width: SLOT_WIDTH,
            slot_gap: SLOT_GAP,
            viewport_width: VIEWPORT_WIDTH,

            idle_speed: IDLE_SPEED,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            spin_distance_min: SPIN_DISTANCE_MIN,
            spin_distance_max: SPIN_DISTANCE_MAX,

            ramp_ms: RAMP_MS,
            pause_ms: PAUSE_MS,
            snap_ms: SNAP_MS,

            visual_tiers: default_tiers(),
        }
    }
}

impl WheelSettings {
    /// Create settings from a timing preset
    pub fn from_preset(preset: TimingPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a timing preset (updates durations and speed allowance)
    pub fn apply_preset(&mut self, preset: TimingPreset) {
        self.preset = preset;
        self.ramp_ms = preset.ramp_ms();
        self.pause_ms = preset.pause_ms();
        self.snap_ms = preset.snap_ms();
        self.max_speed = preset.max_speed();
    }

    pub fn geometry(&self) -> SlotGeometry {
        SlotGeometry {
            slot_width: self.slot_width,
            gap: self.slot_gap,
            viewport_width: self.viewport_width,
        }
    }

    /// Frame-based spin controller for these settings
    pub fn controller(&self) -> SpinController {
        SpinController {
            ramp_ticks: ms_to_ticks(self.ramp_ms),
            pause_ticks: ms_to_ticks(self.pause_ms),
            snap_ticks: ms_to_ticks(self.snap_ms),
            distance_min: self.spin_distance_min,
            distance_max: self.spin_distance_max,
            min_speed: self.min_speed,
            idle_speed: self.idle_speed,
        }
    }

    /// Check everything that is not catalog-specific
    pub fn validate(&self) -> Result<(), WheelError> {
        if self.ring_size < 2 {
            return Err(WheelError::InvalidRingSize(self.ring_size));
        }

        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.slot_width) || !positive(self.viewport_width) {
            return Err(WheelError::InvalidGeometry(
                "slot and viewport widths must be positive",
            ));
        }
        if !self.slot_gap.is_finite() || self.slot_gap < 0.0 {
            return Err(WheelError::InvalidGeometry("slot gap must not be negative"));
        }
        // The strip must cover the viewport plus the slot being recycled
        let pitch = self.geometry().pitch();
        if (self.ring_size as f64) * pitch < self.viewport_width + pitch {
            return Err(WheelError::InvalidGeometry(
                "ring too short to cover the viewport",
            ));
        }

        if !positive(self.idle_speed) || !positive(self.min_speed) || !positive(self.max_speed) {
            return Err(WheelError::InvalidTiming("speeds must be positive"));
        }
        if !positive(self.spin_distance_min) || self.spin_distance_max < self.spin_distance_min {
            return Err(WheelError::InvalidTiming("spin distance range is empty"));
        }
        if !self.spin_distance_max.is_finite() {
            return Err(WheelError::InvalidTiming("spin distance must be finite"));
        }
        if !self.ramp_ms.is_finite() || !self.pause_ms.is_finite() || !self.snap_ms.is_finite() {
            return Err(WheelError::InvalidTiming("durations must be finite"));
        }
        if self.pause_ms < 0.0 || self.snap_ms < 0.0 {
            return Err(WheelError::InvalidTiming("durations must not be negative"));
        }

        let controller = self.controller();
        if controller.ramp_ticks == 0 {
            return Err(WheelError::InvalidTiming("ramp must last at least one frame"));
        }
        let peak = controller.peak_speed(controller.max_travel(pitch));
        if peak > self.max_speed {
            return Err(WheelError::SpeedLimit {
                peak,
                max: self.max_speed,
            });
        }
        Ok(())
    }

    /// Validate and assemble the simulation machinery around a catalog
    pub fn build_parts(&self, catalog: PrizeCatalog) -> Result<WheelParts, WheelError> {
        self.validate()?;
        let visual = VisualSampler::new(&self.visual_tiers, &catalog)?;
        Ok(WheelParts {
            selector: WeightedPrizeSelector::new(catalog),
            visual,
            controller: self.controller(),
            conveyor: ConveyorAnimator::new(),
        })
    }

    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, WheelError> {
        let settings: Self = serde_json::from_str(json)?;
        log::info!("Loaded wheel settings (preset {})", settings.preset.as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, WheelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
