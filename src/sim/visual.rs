//! Cosmetic prize sampling for idle and scrolling slots
//!
//! Hand-tuned tiers, unrelated to the payout odds. Never used for payout.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::{Prize, PrizeCatalog};
use crate::consts::WEIGHT_TOTAL;
use crate::error::WheelError;

/// One tier of the visual distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTier {
    /// Cumulative upper bound of this tier on the [0, 100) roll
    pub threshold: f64,
    /// Catalog ids drawn uniformly within the tier
    pub ids: Vec<String>,
}

impl VisualTier {
    pub fn new(threshold: f64, ids: &[&str]) -> Self {
        Self {
            threshold,
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Shipped tiering: commons dominate, the golden dragon is never previewed
pub fn default_tiers() -> Vec<VisualTier> {
    vec![
        VisualTier::new(70.0, &["coin_10", "coin_25", "coin_50"]),
        VisualTier::new(90.0, &["coin_100", "coin_250", "gift_crystal"]),
        VisualTier::new(98.0, &["coin_500", "gift_loot_bag"]),
        VisualTier::new(100.0, &["coin_1000"]),
    ]
}

#[derive(Debug, Clone)]
struct ResolvedTier {
    threshold: f64,
    prizes: Vec<Prize>,
}

/// Tiered uniform sampler
#[derive(Debug, Clone)]
pub struct VisualSampler {
    tiers: Vec<ResolvedTier>,
    fallback: Prize,
}

impl VisualSampler {
    /// Resolve tier ids against the catalog
    pub fn new(tiers: &[VisualTier], catalog: &PrizeCatalog) -> Result<Self, WheelError> {
        if tiers.is_empty() {
            return Err(WheelError::InvalidTier("no tiers configured".into()));
        }

        let mut resolved = Vec::with_capacity(tiers.len());
        let mut previous = 0.0;
        for (i, tier) in tiers.iter().enumerate() {
            if !tier.threshold.is_finite() || tier.threshold <= previous {
                return Err(WheelError::InvalidTier(format!(
                    "tier {i} threshold {} must exceed {previous}",
                    tier.threshold
                )));
            }
            if tier.ids.is_empty() {
                return Err(WheelError::InvalidTier(format!("tier {i} has no prizes")));
            }
            let prizes = tier
                .ids
                .iter()
                .map(|id| {
                    catalog
                        .get(id)
                        .cloned()
                        .ok_or_else(|| WheelError::UnknownPrize(id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push(ResolvedTier {
                threshold: tier.threshold,
                prizes,
            });
            previous = tier.threshold;
        }

        if (previous - WEIGHT_TOTAL).abs() > f64::EPSILON {
            return Err(WheelError::InvalidTier(format!(
                "last threshold is {previous}, expected 100"
            )));
        }

        Ok(Self {
            tiers: resolved,
            fallback: catalog.first().clone(),
        })
    }

    /// Draw a cosmetic prize
    pub fn select_visual_prize<R: Rng + ?Sized>(&self, rng: &mut R) -> &Prize {
        let roll = rng.random::<f64>() * WEIGHT_TOTAL;
        for tier in &self.tiers {
            if roll < tier.threshold {
                let pick = rng.random_range(0..tier.prizes.len());
                return &tier.prizes[pick];
            }
        }

        log::warn!(
            "Visual tier walk exhausted (roll {roll}), falling back to '{}'",
            self.fallback.id
        );
        &self.fallback
    }

    /// True when the id can never be shown by this sampler
    pub fn excludes(&self, id: &str) -> bool {
        !self
            .tiers
            .iter()
            .any(|t| t.prizes.iter().any(|p| p.id == id))
    }

    /// Probability that a draw returns `id`
    pub fn probability_of(&self, id: &str) -> f64 {
        let mut previous = 0.0;
        let mut total = 0.0;
        for tier in &self.tiers {
            let span = (tier.threshold - previous) / WEIGHT_TOTAL;
            let hits = tier.prizes.iter().filter(|p| p.id == id).count();
            total += span * hits as f64 / tier.prizes.len() as f64;
            previous = tier.threshold;
        }
        total
    }
}
