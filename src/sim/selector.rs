//! Real-odds prize selection
//!
//! The single source of truth for payout odds. Takes nothing but the catalog
//! and an RNG, so animation state cannot leak into the draw.

use rand::Rng;

use super::catalog::{Prize, PrizeCatalog};
use crate::consts::WEIGHT_TOTAL;

/// Cumulative-walk sampler over the catalog weights
#[derive(Debug, Clone)]
pub struct WeightedPrizeSelector {
    catalog: PrizeCatalog,
}

impl WeightedPrizeSelector {
    pub fn new(catalog: PrizeCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PrizeCatalog {
        &self.catalog
    }

    /// Draw the real prize for a spin
    pub fn select_prize<R: Rng + ?Sized>(&self, rng: &mut R) -> &Prize {
        let roll = rng.random::<f64>() * WEIGHT_TOTAL;
        self.select_with_roll(roll)
    }

    /// Resolve a roll in [0, 100) against the cumulative weights
    pub fn select_with_roll(&self, roll: f64) -> &Prize {
        let mut cumulative = 0.0;
        for prize in self.catalog.iter() {
            cumulative += prize.weight;
            if roll <= cumulative {
                return prize;
            }
        }

        // Only reachable when float drift leaves the sum a hair under the roll
        let fallback = self.catalog.first();
        log::warn!(
            "Prize walk exhausted (roll {roll}, cumulative {cumulative}), falling back to '{}'",
            fallback.id
        );
        fallback
    }

    /// Relative probability mass that would land on the exhaustion fallback
    pub fn fallback_mass(&self) -> f64 {
        let cumulative: f64 = self.catalog.iter().map(|p| p.weight).sum();
        ((WEIGHT_TOTAL - cumulative) / WEIGHT_TOTAL).max(0.0)
    }
}
