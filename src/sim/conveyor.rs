//! Per-frame strip motion and emphasis
//!
//! The conveyor runs every frame for the life of the wheel. It never decides
//! speed on its own: the spin controller sets `scroll_speed` and the conveyor
//! integrates it.

use rand::Rng;

use super::ring::SlotRecycler;
use super::state::WheelState;
use super::visual::VisualSampler;
use crate::consts::{MAX_SCALE, MIN_SCALE};

/// Presentation emphasis for one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emphasis {
    pub slot_id: u32,
    pub scale: f32,
    pub highlighted: bool,
}

/// Scale for a slot `distance` away from the viewport center
#[inline]
pub fn emphasis_scale(distance: f64, max_distance: f64) -> f32 {
    if max_distance <= 0.0 {
        return MIN_SCALE;
    }
    let scale = MAX_SCALE as f64 - 0.9 * distance / max_distance;
    (scale as f32).max(MIN_SCALE)
}

/// Integrates scroll speed into strip motion
#[derive(Debug, Clone, Default)]
pub struct ConveyorAnimator;

impl ConveyorAnimator {
    pub fn new() -> Self {
        Self
    }

    /// Advance one frame at the current speed
    pub fn tick<R: Rng + ?Sized>(
        &self,
        state: &mut WheelState,
        sampler: &VisualSampler,
        rng: &mut R,
    ) -> Vec<u32> {
        let delta = state.scroll_speed;
        self.nudge(state, delta, sampler, rng)
    }

    /// Move the strip by an explicit delta (may be negative)
    pub fn nudge<R: Rng + ?Sized>(
        &self,
        state: &mut WheelState,
        delta: f64,
        sampler: &VisualSampler,
        rng: &mut R,
    ) -> Vec<u32> {
        if delta == 0.0 {
            return Vec::new();
        }
        // Recycled slots keep their content for the whole spin, resolution included
        let frozen = state.pending.is_some();
        state.total_scrolled += delta;
        state.ring.advance(delta, frozen, sampler, rng)
    }

    /// Scale and highlight for every slot, by distance from the center
    pub fn emphasis(&self, ring: &SlotRecycler) -> Vec<Emphasis> {
        let geometry = ring.geometry();
        let center = geometry.center_x();
        let max_distance = geometry.viewport_width / 2.0;
        let half_pitch = geometry.pitch() / 2.0;

        ring.iter()
            .enumerate()
            .map(|(position, slot)| {
                let distance = (geometry.slot_center(position, ring.offset()) - center).abs();
                Emphasis {
                    slot_id: slot.id,
                    scale: emphasis_scale(distance, max_distance),
                    highlighted: distance < half_pitch,
                }
            })
            .collect()
    }
}
