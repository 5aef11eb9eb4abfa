//! Wheel facade
//!
//! Owns the state, the machinery and the RNG. Inbound operations are
//! `request_spin` and `acknowledge_resolution`; `tick` runs one frame and
//! pushes the results out to the presenter and the resolution sink.

use rand_pcg::Pcg32;

use crate::error::WheelError;
use crate::present::{ResolutionSink, SlotPresenter};
use crate::settings::WheelSettings;
use crate::sim::catalog::{Playback, PrizeCatalog};
use crate::sim::ring::SlotRecycler;
use crate::sim::state::{SpinPhase, WheelEvent, WheelState};
use crate::sim::tick::{TickInput, WheelParts, tick};

/// A running reward wheel
#[derive(Debug, Clone)]
pub struct Wheel {
    settings: WheelSettings,
    parts: WheelParts,
    state: WheelState,
    rng: Pcg32,
}

impl Wheel {
    /// Build a wheel with a random seed
    pub fn new(settings: WheelSettings, catalog: PrizeCatalog) -> Result<Self, WheelError> {
        Self::with_seed(settings, catalog, rand::random())
    }

    /// Build a wheel with a fixed seed (reproducible runs)
    pub fn with_seed(
        settings: WheelSettings,
        catalog: PrizeCatalog,
        seed: u64,
    ) -> Result<Self, WheelError> {
        let parts = settings.build_parts(catalog)?;
        let mut state = WheelState::new(
            seed,
            settings.ring_size,
            settings.geometry(),
            settings.idle_speed,
        );
        let mut rng = state.rng_state.to_rng();
        state.ring.populate(&parts.visual, &mut rng);

        log::info!(
            "Wheel ready: {} slots, {} prizes, seed {seed}",
            settings.ring_size,
            parts.selector.catalog().len()
        );
        Ok(Self {
            settings,
            parts,
            state,
            rng,
        })
    }

    /// Start a spin. No-op (false) unless idle.
    pub fn request_spin(&mut self) -> bool {
        self.parts
            .controller
            .start(&mut self.state, &self.parts.selector, &mut self.rng)
    }

    /// Clear a resolved spin. No-op (false) unless resolved.
    pub fn acknowledge_resolution(&mut self) -> bool {
        self.parts.controller.acknowledge(&mut self.state)
    }

    /// Run one frame and publish its effects
    pub fn tick<P, S>(
        &mut self,
        presenter: &mut P,
        sink: &mut S,
    ) -> Result<Vec<WheelEvent>, WheelError>
    where
        P: SlotPresenter + ?Sized,
        S: ResolutionSink + ?Sized,
    {
        let result = tick(
            &mut self.state,
            &self.parts,
            &TickInput::default(),
            &mut self.rng,
        );

        self.present(presenter);

        // Dispatch before surfacing an error so an abort event is never lost
        let events = self.state.drain_events();
        for event in &events {
            if let WheelEvent::PrizeResolved(prize) = event {
                if let Some(slot_id) = self.state.landing_slot_index() {
                    presenter.play_asset(slot_id, &prize.visual_asset_ref, Playback::Once);
                }
                sink.on_prize_resolved(prize);
            }
        }

        result.map(|_| events)
    }

    fn present<P: SlotPresenter + ?Sized>(&mut self, presenter: &mut P) {
        for slot in self.state.ring.iter_mut().filter(|s| s.dirty) {
            slot.dirty = false;
            if let Some(prize) = &slot.prize {
                presenter.render_slot(slot.id, prize);
                presenter.play_asset(slot.id, &prize.visual_asset_ref, prize.playback());
            }
        }
        for emphasis in self.parts.conveyor.emphasis(&self.state.ring) {
            presenter.set_slot_emphasis(emphasis.slot_id, emphasis.scale, emphasis.highlighted);
        }
    }

    pub fn state(&self) -> &WheelState {
        &self.state
    }

    pub fn phase(&self) -> SpinPhase {
        self.state.phase
    }

    pub fn ring(&self) -> &SlotRecycler {
        &self.state.ring
    }

    pub fn catalog(&self) -> &PrizeCatalog {
        self.parts.selector.catalog()
    }

    pub fn settings(&self) -> &WheelSettings {
        &self.settings
    }
}
