//! Deterministic simulation module
//!
//! All wheel logic lives here. This module must be pure and deterministic:
//! - Fixed frame step only
//! - Seeded RNG only
//! - Stable catalog walk order
//! - No rendering or platform dependencies

pub mod catalog;
pub mod conveyor;
pub mod ring;
pub mod selector;
pub mod spin;
pub mod state;
pub mod tick;
pub mod visual;

pub use catalog::{GOLDEN_DRAGON_ID, Playback, Prize, PrizeCatalog, PrizeKind};
pub use conveyor::{ConveyorAnimator, Emphasis, emphasis_scale};
pub use ring::{Slot, SlotGeometry, SlotRecycler};
pub use selector::WeightedPrizeSelector;
pub use spin::{SpinController, landing_position};
pub use state::{PendingSpin, RngState, SpinPhase, WheelEvent, WheelState};
pub use tick::{TickInput, WheelParts, tick};
pub use visual::{VisualSampler, VisualTier, default_tiers};
