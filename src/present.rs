//! Outbound collaborators
//!
//! The engine never draws anything. It tells a presenter what each slot shows
//! and how prominent it is, and hands resolved prizes to a sink.

use crate::sim::catalog::{Playback, Prize};

/// Receives slot content and emphasis updates
pub trait SlotPresenter {
    /// Show `prize` (asset + label overlay) in the slot
    fn render_slot(&mut self, slot_id: u32, prize: &Prize);

    /// Scale and border highlight for the slot
    fn set_slot_emphasis(&mut self, slot_id: u32, scale: f32, highlighted: bool);

    /// Load an asset into the slot's container and loop or play it
    fn play_asset(&mut self, _slot_id: u32, _asset_ref: &str, _playback: Playback) {}
}

/// Receives the outcome of each completed spin, exactly once per spin
pub trait ResolutionSink {
    fn on_prize_resolved(&mut self, prize: &Prize);
}

/// Presenter for headless runs
#[derive(Debug, Default)]
pub struct NullPresenter;

impl SlotPresenter for NullPresenter {
    fn render_slot(&mut self, _slot_id: u32, _prize: &Prize) {}

    fn set_slot_emphasis(&mut self, _slot_id: u32, _scale: f32, _highlighted: bool) {}
}
