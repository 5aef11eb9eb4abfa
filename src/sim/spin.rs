//! Spin state machine
//!
//! Idle -> Spinning -> Settling -> Snapping -> Resolved -> Idle
//!
//! The real prize is drawn and pinned into the landing slot before any motion.
//! The ramp then travels exactly the drawn distance, so the slot nearest the
//! center afterwards is the one computed at start. Recycling never rewrites a
//! slot while a spin is pending, which keeps the pinned prize in place.

use rand::Rng;

use super::conveyor::ConveyorAnimator;
use super::selector::WeightedPrizeSelector;
use super::state::{PendingSpin, SpinPhase, WheelEvent, WheelState};
use super::visual::VisualSampler;
use crate::error::WheelError;
use crate::{ease_out_cubic, ease_out_quart};

/// Landing points closer than this (fraction of a pitch) to a half-pitch tie get nudged
const TIE_MARGIN: f64 = 0.01;
/// Size of the nudge (fraction of a pitch)
const TIE_NUDGE: f64 = 0.02;

/// Frame-based timing and motion limits for a spin
#[derive(Debug, Clone, PartialEq)]
pub struct SpinController {
    pub ramp_ticks: u32,
    pub pause_ticks: u32,
    pub snap_ticks: u32,
    pub distance_min: f64,
    pub distance_max: f64,
    pub min_speed: f64,
    pub idle_speed: f64,
}

impl SpinController {
    /// Lowest per-frame speed during a ramp of `distance`. Falls below
    /// `min_speed` only when the ramp is too short to cover it at that speed.
    fn ramp_floor(&self, distance: f64) -> f64 {
        self.min_speed.min(distance / self.ramp_ticks.max(1) as f64)
    }

    /// Speed of ramp frame `k` (1-based): the ease-out quart position delta
    /// scaled by `scale`, floored at the ramp floor
    fn ramp_step(&self, distance: f64, scale: f64, k: u32) -> f64 {
        let frames = self.ramp_ticks.max(1) as f64;
        let delta = ease_out_quart(k as f64 / frames) - ease_out_quart((k - 1) as f64 / frames);
        (distance * delta * scale).max(self.ramp_floor(distance))
    }

    fn ramp_total(&self, distance: f64, scale: f64) -> f64 {
        (1..=self.ramp_ticks.max(1))
            .map(|k| self.ramp_step(distance, scale, k))
            .sum()
    }

    /// Largest curve scale whose floored ramp does not overshoot `distance`.
    ///
    /// The floored total grows monotonically with the scale, from
    /// `frames * floor <= distance` at 0 to at least `distance` at 1.
    pub fn ramp_scale(&self, distance: f64) -> f64 {
        if self.ramp_total(distance, 1.0) <= distance {
            return 1.0;
        }
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..64 {
            let mid = 0.5 * (lo + hi);
            if self.ramp_total(distance, mid) > distance {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        lo
    }

    /// Speed on the first ramp frame for a spin of `distance`
    pub fn peak_speed(&self, distance: f64) -> f64 {
        self.ramp_step(distance, self.ramp_scale(distance), 1)
    }

    /// Longest distance a spin can actually travel (tie nudge included)
    pub fn max_travel(&self, pitch: f64) -> f64 {
        self.distance_max + TIE_NUDGE * pitch
    }

    /// Draw a spin distance, kept clear of half-pitch ties
    fn draw_distance<R: Rng + ?Sized>(&self, rng: &mut R, residual: f64, pitch: f64) -> f64 {
        let distance = if self.distance_max > self.distance_min {
            rng.random_range(self.distance_min..self.distance_max)
        } else {
            self.distance_min
        };
        clear_of_tie(distance, residual, pitch, self.distance_min, self.distance_max)
    }

    /// Idle -> Spinning. Returns false (no-op) unless idle.
    pub fn start<R: Rng + ?Sized>(
        &self,
        state: &mut WheelState,
        selector: &WeightedPrizeSelector,
        rng: &mut R,
    ) -> bool {
        if state.phase != SpinPhase::Idle {
            log::debug!("Spin rejected in phase {}", state.phase.as_str());
            return false;
        }
        let Some((center_position, residual)) = state.ring.nearest_to_center() else {
            log::error!("Spin rejected: slot ring is empty");
            return false;
        };

        // Committed before anything moves
        let prize = selector.select_prize(rng).clone();

        let pitch = state.ring.geometry().pitch();
        let distance = self.draw_distance(rng, residual, pitch);
        let position = landing_position(center_position, residual, distance, pitch, state.ring.len());
        let Some(landing_slot) = state.ring.slot_at(position).map(|s| s.id) else {
            return false;
        };
        state.ring.set_slot_prize(landing_slot, prize.clone());

        log::info!(
            "Spin started: prize '{}', distance {:.1}, landing slot {} (ring position {})",
            prize.id,
            distance,
            landing_slot,
            position
        );
        state.events.push(WheelEvent::SpinStarted {
            prize_id: prize.id.clone(),
            landing_slot,
        });
        state.pending = Some(PendingSpin {
            prize,
            landing_slot,
            distance,
            travelled: 0.0,
            ramp_scale: self.ramp_scale(distance),
            snap_residual: 0.0,
            snap_applied: 0.0,
        });
        state.scroll_speed = self.peak_speed(distance);
        state.enter(SpinPhase::Spinning);
        true
    }

    /// Resolved -> Idle. Returns false (no-op) unless resolved.
    pub fn acknowledge(&self, state: &mut WheelState) -> bool {
        if state.phase != SpinPhase::Resolved {
            log::debug!("Acknowledge ignored in phase {}", state.phase.as_str());
            return false;
        }
        state.pending = None;
        state.scroll_speed = self.idle_speed;
        state.enter(SpinPhase::Idle);
        true
    }

    /// Advance the state machine by one frame. Runs before the conveyor.
    pub fn update<R: Rng + ?Sized>(
        &self,
        state: &mut WheelState,
        conveyor: &ConveyorAnimator,
        sampler: &VisualSampler,
        rng: &mut R,
    ) -> Result<(), WheelError> {
        match state.phase {
            SpinPhase::Idle | SpinPhase::Resolved => Ok(()),
            SpinPhase::Spinning => {
                self.ramp(state);
                Ok(())
            }
            SpinPhase::Settling => {
                if state.phase_ticks >= self.pause_ticks {
                    self.begin_snap(state)
                } else {
                    state.phase_ticks += 1;
                    Ok(())
                }
            }
            SpinPhase::Snapping => self.snap(state, conveyor, sampler, rng),
        }
    }

    /// Set this frame's speed along the deceleration curve
    fn ramp(&self, state: &mut WheelState) {
        if state.phase_ticks >= self.ramp_ticks {
            state.scroll_speed = 0.0;
            state.enter(SpinPhase::Settling);
            return;
        }
        state.phase_ticks += 1;
        let frame = state.phase_ticks;

        let Some(pending) = state.pending.as_mut() else {
            return;
        };
        // The last frame absorbs rounding so the total is exactly the distance
        let step = if frame >= self.ramp_ticks {
            pending.distance - pending.travelled
        } else {
            self.ramp_step(pending.distance, pending.ramp_scale, frame)
        };
        pending.travelled += step;
        state.scroll_speed = step;
    }

    fn begin_snap(&self, state: &mut WheelState) -> Result<(), WheelError> {
        let Some((_, residual)) = state.ring.nearest_to_center() else {
            return Err(self.abort(state));
        };
        if let Some(pending) = state.pending.as_mut() {
            pending.snap_residual = residual;
            pending.snap_applied = 0.0;
        }
        log::debug!("Snapping by {residual:.3}");
        state.enter(SpinPhase::Snapping);
        Ok(())
    }

    fn snap<R: Rng + ?Sized>(
        &self,
        state: &mut WheelState,
        conveyor: &ConveyorAnimator,
        sampler: &VisualSampler,
        rng: &mut R,
    ) -> Result<(), WheelError> {
        state.phase_ticks += 1;
        let progress = if self.snap_ticks == 0 {
            1.0
        } else {
            state.phase_ticks as f64 / self.snap_ticks as f64
        };

        let delta = match state.pending.as_mut() {
            Some(pending) => {
                let target = pending.snap_residual * ease_out_cubic(progress);
                let delta = target - pending.snap_applied;
                pending.snap_applied = target;
                delta
            }
            None => 0.0,
        };
        conveyor.nudge(state, delta, sampler, rng);

        if progress >= 1.0 {
            self.resolve(state)
        } else {
            Ok(())
        }
    }

    /// Snapping -> Resolved: read the centered slot back and emit it
    fn resolve(&self, state: &mut WheelState) -> Result<(), WheelError> {
        let centered = state
            .ring
            .nearest_to_center()
            .and_then(|(position, _)| state.ring.slot_at(position))
            .and_then(|slot| slot.prize.clone());
        let Some(prize) = centered else {
            return Err(self.abort(state));
        };

        if let Some(pending) = &state.pending {
            if pending.prize != prize {
                log::error!(
                    "Resolved '{}' but committed '{}' (landing slot {})",
                    prize.id,
                    pending.prize.id,
                    pending.landing_slot
                );
                debug_assert!(false, "resolved prize differs from committed prize");
            }
        }

        log::info!("Spin resolved: '{}'", prize.id);
        state.spins_resolved += 1;
        state.events.push(WheelEvent::PrizeResolved(prize));
        state.enter(SpinPhase::Resolved);
        Ok(())
    }

    /// Back to idle without a resolution
    fn abort(&self, state: &mut WheelState) -> WheelError {
        log::error!("Spin aborted: no slot to center");
        state.pending = None;
        state.scroll_speed = self.idle_speed;
        state.events.push(WheelEvent::SpinAborted);
        state.enter(SpinPhase::Idle);
        WheelError::EmptyRing
    }
}

/// Shift `distance` off a half-pitch tie so the nearest slot is unambiguous.
///
/// Either direction clears the tie; the one that stays inside `[min, max]` is
/// preferred. A range narrower than the nudge may still be left by it.
pub fn clear_of_tie(distance: f64, residual: f64, pitch: f64, min: f64, max: f64) -> f64 {
    let t = (distance - residual) / pitch + 0.5;
    let frac = t - t.floor();
    let nudge = TIE_NUDGE * pitch;
    let (preferred, other) = if frac < TIE_MARGIN {
        (distance + nudge, distance - nudge)
    } else if frac > 1.0 - TIE_MARGIN {
        (distance - nudge, distance + nudge)
    } else {
        return distance;
    };
    let in_range = |d: f64| d >= min && d <= max;
    if !in_range(preferred) && in_range(other) {
        other
    } else {
        preferred
    }
}

/// Ring position (at spin start) that ends nearest the center after `distance`.
///
/// `residual` is the signed offset of the currently centered slot. With the
/// strip at rest on a slot this is `floor(distance / pitch)` positions past it.
pub fn landing_position(
    center_position: usize,
    residual: f64,
    distance: f64,
    pitch: f64,
    ring_size: usize,
) -> usize {
    let steps = ((distance - residual) / pitch + 0.5).floor() as i64;
    (center_position as i64 + steps).rem_euclid(ring_size.max(1) as i64) as usize
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::sim::catalog::{Prize, PrizeCatalog};
    use crate::sim::ring::SlotGeometry;
    use crate::sim::visual::default_tiers;

    fn controller() -> SpinController {
        SpinController {
            ramp_ticks: 300,
            pause_ticks: 18,
            snap_ticks: 24,
            distance_min: 3000.0,
            distance_max: 4000.0,
            min_speed: 0.5,
            idle_speed: 1.0,
        }
    }

    fn empty_state() -> WheelState {
        let geometry = SlotGeometry {
            slot_width: 150.0,
            gap: 18.0,
            viewport_width: 840.0,
        };
        WheelState::new(1, 0, geometry, 1.0)
    }

    #[test]
    fn test_landing_position_aligned() {
        // D = 3200, pitch 168: 19 positions past the centered slot
        assert_eq!(landing_position(3, 0.0, 3200.0, 168.0, 12), (3 + 19) % 12);
        assert_eq!(landing_position(0, 0.0, 3200.0, 168.0, 64), 19);
    }

    #[test]
    fn test_landing_position_with_residual() {
        // Centered slot sits 50 units right of center: it needs 50 of the distance
        assert_eq!(landing_position(2, 50.0, 168.0 + 50.0, 168.0, 12), 3);
        // Slot left of center: less distance reaches the next one
        assert_eq!(landing_position(2, -100.0, 80.0, 168.0, 12), 3);
    }

    #[test]
    fn test_clear_of_tie() {
        // Exactly half a pitch past a slot is a tie
        let d = clear_of_tie(168.0 * 10.5, 0.0, 168.0, 0.0, 4000.0);
        assert!((d - 168.0 * 10.5).abs() > 1.0);
        // Far from a tie stays put
        assert_eq!(clear_of_tie(3200.0, 0.0, 168.0, 3000.0, 4000.0), 3200.0);
    }

    #[test]
    fn test_clear_of_tie_stays_in_range() {
        let pitch = 168.0;
        // Just past a tie (nudged up by default) at the top of the range
        let tie = pitch * 20.5 + 0.5;
        let d = clear_of_tie(tie, 0.0, pitch, 3000.0, tie);
        assert!(d < tie && d >= 3000.0);
        let t = d / pitch + 0.5;
        assert!((t - t.floor() - 0.5).abs() < 0.5 - TIE_MARGIN);

        // Just short of a tie at the bottom of the range goes up instead
        let tie = pitch * 17.5 - 0.5;
        let d = clear_of_tie(tie, 0.0, pitch, tie, 4000.0);
        assert!(d > tie && d <= 4000.0);
    }

    #[test]
    fn test_max_travel_includes_nudge() {
        let c = controller();
        assert_eq!(c.max_travel(168.0), 4000.0 + TIE_NUDGE * 168.0);
    }

    #[test]
    fn test_peak_speed() {
        let peak = controller().peak_speed(4000.0);
        assert!(peak > 50.0 && peak < 60.0);
        // Never more than the whole distance
        let one_frame = SpinController {
            ramp_ticks: 1,
            ..controller()
        };
        assert_eq!(one_frame.peak_speed(500.0), 500.0);
    }

    #[test]
    fn test_start_rejected_on_empty_ring() {
        let selector = WeightedPrizeSelector::new(PrizeCatalog::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = empty_state();
        assert!(!controller().start(&mut state, &selector, &mut rng));
        assert_eq!(state.phase, SpinPhase::Idle);
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_snap_without_slots_aborts() {
        let sampler = VisualSampler::new(&default_tiers(), &PrizeCatalog::default()).unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = empty_state();
        state.pending = Some(PendingSpin {
            prize: Prize::coin("a", 1, "a.png", 100.0),
            landing_slot: 0,
            distance: 100.0,
            travelled: 100.0,
            ramp_scale: 1.0,
            snap_residual: 0.0,
            snap_applied: 0.0,
        });
        state.enter(SpinPhase::Settling);

        let controller = SpinController {
            pause_ticks: 0,
            ..controller()
        };
        let result = controller.update(&mut state, &ConveyorAnimator::new(), &sampler, &mut rng);
        assert!(matches!(result, Err(WheelError::EmptyRing)));
        assert_eq!(state.phase, SpinPhase::Idle);
        assert!(state.pending.is_none());
        assert_eq!(state.scroll_speed, 1.0);
        assert_eq!(state.drain_events(), vec![WheelEvent::SpinAborted]);
    }

    #[test]
    fn test_ramp_covers_distance_exactly() {
        let controller = controller();
        let mut state = empty_state();
        state.pending = Some(PendingSpin {
            prize: Prize::coin("a", 1, "a.png", 100.0),
            landing_slot: 0,
            distance: 3456.7,
            travelled: 0.0,
            ramp_scale: controller.ramp_scale(3456.7),
            snap_residual: 0.0,
            snap_applied: 0.0,
        });
        state.enter(SpinPhase::Spinning);

        let mut moved = 0.0;
        let mut last = f64::MAX;
        while state.phase == SpinPhase::Spinning {
            controller.ramp(&mut state);
            moved += state.scroll_speed;
            // Decelerating, never below the floor before the stop
            if state.phase == SpinPhase::Spinning {
                assert!(state.scroll_speed >= controller.min_speed - 1e-9);
                if state.phase_ticks < controller.ramp_ticks {
                    assert!(state.scroll_speed <= last + 1e-9);
                    last = state.scroll_speed;
                }
            }
        }
        assert_eq!(state.phase, SpinPhase::Settling);
        assert!((moved - 3456.7).abs() < 1e-6);
    }

    #[test]
    fn test_ramp_floor_holds_after_scaling() {
        let controller = controller();
        for distance in [3000.0, 3500.0, 4000.0] {
            let scale = controller.ramp_scale(distance);
            assert!(scale > 0.0 && scale <= 1.0);
            let steps: Vec<f64> = (1..=controller.ramp_ticks)
                .map(|k| controller.ramp_step(distance, scale, k))
                .collect();
            let slowest = steps.iter().cloned().fold(f64::MAX, f64::min);
            assert!(slowest >= controller.min_speed, "{distance}: {slowest}");
            // The frames before the last never overshoot the distance
            let before_last: f64 = steps[..steps.len() - 1].iter().sum();
            assert!(distance - before_last >= controller.min_speed - 1e-9);
        }
    }

    #[test]
    fn test_short_ramp_spreads_evenly() {
        // 300 frames at 0.5 would cover 150, more than the distance
        let controller = controller();
        let scale = controller.ramp_scale(60.0);
        for k in 1..=controller.ramp_ticks {
            assert!((controller.ramp_step(60.0, scale, k) - 0.2).abs() < 1e-9);
        }
    }
}
