//! Fixed timestep simulation tick
//!
//! One frame: apply one-shot inputs, run the spin controller, then let the
//! conveyor integrate whatever speed the controller left behind.

use rand::Rng;

use super::conveyor::ConveyorAnimator;
use super::selector::WeightedPrizeSelector;
use super::spin::SpinController;
use super::state::WheelState;
use super::visual::VisualSampler;
use crate::error::WheelError;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Request a spin (ignored unless idle)
    pub spin: bool,
    /// Acknowledge a resolved prize (ignored unless resolved)
    pub acknowledge: bool,
}

/// The immutable machinery a tick runs against
#[derive(Debug, Clone)]
pub struct WheelParts {
    pub selector: WeightedPrizeSelector,
    pub visual: VisualSampler,
    pub controller: SpinController,
    pub conveyor: ConveyorAnimator,
}

/// Advance the wheel by one fixed frame
pub fn tick<R: Rng + ?Sized>(
    state: &mut WheelState,
    parts: &WheelParts,
    input: &TickInput,
    rng: &mut R,
) -> Result<(), WheelError> {
    state.time_ticks += 1;

    if input.acknowledge {
        parts.controller.acknowledge(state);
    }
    if input.spin {
        parts.controller.start(state, &parts.selector, rng);
    }

    parts
        .controller
        .update(state, &parts.conveyor, &parts.visual, rng)?;

    parts.conveyor.tick(state, &parts.visual, rng);
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::settings::WheelSettings;
    use crate::sim::state::{SpinPhase, WheelEvent};

    fn setup(seed: u64) -> (WheelState, WheelParts, Pcg32) {
        let settings = WheelSettings::default();
        let parts = settings.build_parts(Default::default()).unwrap();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut state = WheelState::new(
            seed,
            settings.ring_size,
            settings.geometry(),
            settings.idle_speed,
        );
        state.ring.populate(&parts.visual, &mut rng);
        (state, parts, rng)
    }

    fn run_until_resolved(
        state: &mut WheelState,
        parts: &WheelParts,
        rng: &mut Pcg32,
    ) -> Vec<WheelEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            tick(state, parts, &TickInput::default(), rng).unwrap();
            events.extend(state.drain_events());
            if state.phase == SpinPhase::Resolved {
                break;
            }
        }
        events
    }

    #[test]
    fn test_idle_cruise() {
        let (mut state, parts, mut rng) = setup(1);
        for _ in 0..600 {
            tick(&mut state, &parts, &TickInput::default(), &mut rng).unwrap();
        }
        assert_eq!(state.phase, SpinPhase::Idle);
        assert!((state.total_scrolled - 600.0).abs() < 1e-9);
        assert_eq!(state.ring.len(), 12);
    }

    #[test]
    fn test_tick_spin_to_resolved() {
        let (mut state, parts, mut rng) = setup(12345);
        let input = TickInput {
            spin: true,
            ..Default::default()
        };
        tick(&mut state, &parts, &input, &mut rng).unwrap();
        assert_eq!(state.phase, SpinPhase::Spinning);
        assert!(state.spinning());
        let committed = state.pending_prize().cloned().unwrap();

        let events = run_until_resolved(&mut state, &parts, &mut rng);
        assert_eq!(state.phase, SpinPhase::Resolved);
        assert!(!state.spinning());
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, WheelEvent::PrizeResolved(_)))
                .collect::<Vec<_>>(),
            vec![&WheelEvent::PrizeResolved(committed)]
        );

        // Travelled exactly the drawn distance during the ramp
        let pending = state.pending.as_ref().unwrap();
        assert!((pending.travelled - pending.distance).abs() < 1e-6);

        // Strip frozen while resolved
        let offset = state.scroll_offset();
        tick(&mut state, &parts, &TickInput::default(), &mut rng).unwrap();
        assert_eq!(state.scroll_offset(), offset);

        // Acknowledge returns to idle cruise
        let ack = TickInput {
            acknowledge: true,
            ..Default::default()
        };
        tick(&mut state, &parts, &ack, &mut rng).unwrap();
        assert_eq!(state.phase, SpinPhase::Idle);
        assert!(state.pending.is_none());
        assert_eq!(state.scroll_speed, 1.0);
    }

    #[test]
    fn test_phase_durations() {
        let (mut state, parts, mut rng) = setup(77);
        let input = TickInput {
            spin: true,
            ..Default::default()
        };
        tick(&mut state, &parts, &input, &mut rng).unwrap();
        let started = state.time_ticks;

        let mut settled_at = None;
        let mut snapping_at = None;
        while state.phase != SpinPhase::Resolved {
            tick(&mut state, &parts, &TickInput::default(), &mut rng).unwrap();
            if state.phase == SpinPhase::Settling && settled_at.is_none() {
                settled_at = Some(state.time_ticks);
            }
            if state.phase == SpinPhase::Snapping && snapping_at.is_none() {
                snapping_at = Some(state.time_ticks);
            }
        }
        let c = &parts.controller;
        let settled_at = settled_at.unwrap();
        let snapping_at = snapping_at.unwrap();
        assert_eq!(settled_at - started, c.ramp_ticks as u64);
        assert_eq!(snapping_at - settled_at, c.pause_ticks as u64 + 1);
        assert_eq!(state.time_ticks - snapping_at, c.snap_ticks as u64);
    }

    #[test]
    fn test_determinism() {
        let (mut state1, parts, mut rng1) = setup(99999);
        let (mut state2, _, mut rng2) = setup(99999);

        let inputs = [
            TickInput::default(),
            TickInput {
                spin: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for input in &inputs {
            tick(&mut state1, &parts, input, &mut rng1).unwrap();
            tick(&mut state2, &parts, input, &mut rng2).unwrap();
        }
        for _ in 0..500 {
            tick(&mut state1, &parts, &TickInput::default(), &mut rng1).unwrap();
            tick(&mut state2, &parts, &TickInput::default(), &mut rng2).unwrap();
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.pending_prize(), state2.pending_prize());
        assert!((state1.scroll_offset() - state2.scroll_offset()).abs() < 1e-12);
    }
}
