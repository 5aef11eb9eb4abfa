//! Prize catalog
//!
//! Static weighted outcome table. Walk order is the declaration order and is
//! part of the payout contract.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::consts::{WEIGHT_TOLERANCE, WEIGHT_TOTAL};
use crate::error::WheelError;

/// What a prize pays out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrizeKind {
    /// Currency credit
    Coin { amount: u64 },
    /// Collectible that goes to the inventory
    Gift { name: String },
}

/// How the presentation layer should play a prize's asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Static image
    Still,
    /// Animation looped while visible
    Loop,
    /// Animation played once (win reveal)
    Once,
}

/// An immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub id: String,
    #[serde(flatten)]
    pub kind: PrizeKind,
    /// Image path for coins, animation path for gifts
    pub visual_asset_ref: String,
    /// Real-odds probability mass (percent)
    pub weight: f64,
}

impl Prize {
    pub fn coin(id: &str, amount: u64, asset: &str, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            kind: PrizeKind::Coin { amount },
            visual_asset_ref: asset.to_string(),
            weight,
        }
    }

    pub fn gift(id: &str, name: &str, asset: &str, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            kind: PrizeKind::Gift {
                name: name.to_string(),
            },
            visual_asset_ref: asset.to_string(),
            weight,
        }
    }

    /// Coin amount (None for gifts)
    pub fn amount(&self) -> Option<u64> {
        match self.kind {
            PrizeKind::Coin { amount } => Some(amount),
            PrizeKind::Gift { .. } => None,
        }
    }

    /// Gift name (None for coins)
    pub fn gift_name(&self) -> Option<&str> {
        match &self.kind {
            PrizeKind::Coin { .. } => None,
            PrizeKind::Gift { name } => Some(name),
        }
    }

    /// Overlay text shown on the slot
    pub fn label(&self) -> String {
        match &self.kind {
            PrizeKind::Coin { amount } => crate::ledger::format_amount(*amount),
            PrizeKind::Gift { name } => name.clone(),
        }
    }

    /// Reject entries that could never be shown or paid out
    fn validate(&self) -> Result<(), WheelError> {
        let invalid = |reason| {
            Err(WheelError::InvalidPrize {
                id: self.id.clone(),
                reason,
            })
        };
        if self.id.trim().is_empty() {
            return invalid("id is empty");
        }
        if self.visual_asset_ref.trim().is_empty() {
            return invalid("visual asset is empty");
        }
        match &self.kind {
            PrizeKind::Coin { amount: 0 } => invalid("coin amount must be positive"),
            PrizeKind::Gift { name } if name.trim().is_empty() => invalid("gift name is empty"),
            _ => Ok(()),
        }
    }

    /// Idle playback mode for this prize's asset
    pub fn playback(&self) -> Playback {
        match self.kind {
            PrizeKind::Coin { .. } => Playback::Still,
            PrizeKind::Gift { .. } => Playback::Loop,
        }
    }
}

/// Validated, ordered list of prizes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Prize>", into = "Vec<Prize>")]
pub struct PrizeCatalog {
    prizes: Vec<Prize>,
}

impl PrizeCatalog {
    /// Build a catalog, rejecting malformed tables
    pub fn new(prizes: Vec<Prize>) -> Result<Self, WheelError> {
        if prizes.is_empty() {
            return Err(WheelError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for prize in &prizes {
            prize.validate()?;
            if !seen.insert(prize.id.as_str()) {
                return Err(WheelError::DuplicatePrizeId(prize.id.clone()));
            }
            if !prize.weight.is_finite() || prize.weight <= 0.0 {
                return Err(WheelError::InvalidWeight {
                    id: prize.id.clone(),
                    weight: prize.weight,
                });
            }
        }

        let sum: f64 = prizes.iter().map(|p| p.weight).sum();
        if (sum - WEIGHT_TOTAL).abs() > WEIGHT_TOLERANCE {
            return Err(WheelError::WeightSum(sum));
        }

        Ok(Self { prizes })
    }

    /// Parse a catalog from a JSON array of prizes
    pub fn from_json(json: &str) -> Result<Self, WheelError> {
        let prizes: Vec<Prize> = serde_json::from_str(json)?;
        Self::new(prizes)
    }

    pub fn get(&self, id: &str) -> Option<&Prize> {
        self.prizes.iter().find(|p| p.id == id)
    }

    pub fn first(&self) -> &Prize {
        // Non-empty by construction
        &self.prizes[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prize> {
        self.prizes.iter()
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.prizes.iter().map(|p| p.weight).sum()
    }
}

impl TryFrom<Vec<Prize>> for PrizeCatalog {
    type Error = WheelError;

    fn try_from(prizes: Vec<Prize>) -> Result<Self, Self::Error> {
        Self::new(prizes)
    }
}

impl From<PrizeCatalog> for Vec<Prize> {
    fn from(catalog: PrizeCatalog) -> Self {
        catalog.prizes
    }
}

/// Id of the ultra-rare collectible, never previewed on the strip
pub const GOLDEN_DRAGON_ID: &str = "gift_golden_dragon";

impl Default for PrizeCatalog {
    fn default() -> Self {
        Self {
            prizes: vec![
                Prize::coin("coin_10", 10, "assets/coins/coin_10.png", 30.0),
                Prize::coin("coin_25", 25, "assets/coins/coin_25.png", 22.0),
                Prize::coin("coin_50", 50, "assets/coins/coin_50.png", 16.0),
                Prize::coin("coin_100", 100, "assets/coins/coin_100.png", 12.0),
                Prize::coin("coin_250", 250, "assets/coins/coin_250.png", 7.0),
                Prize::coin("coin_500", 500, "assets/coins/coin_500.png", 4.0),
                Prize::coin("coin_1000", 1000, "assets/coins/coin_1000.png", 2.0),
                Prize::gift("gift_crystal", "Crystal", "assets/CrystalForInv.json", 4.0),
                Prize::gift("gift_loot_bag", "Bag of Loot", "assets/DailyGift.json", 2.5),
                Prize::gift(
                    GOLDEN_DRAGON_ID,
                    "Golden Dragon",
                    "assets/GoldenDragon.json",
                    0.5,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = PrizeCatalog::default();
        let rebuilt = PrizeCatalog::new(catalog.iter().cloned().collect());
        assert!(rebuilt.is_ok());
        assert!((catalog.total_weight() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let result = PrizeCatalog::new(vec![
            Prize::coin("a", 1, "a.png", 50.0),
            Prize::coin("a", 2, "b.png", 50.0),
        ]);
        assert!(matches!(result, Err(WheelError::DuplicatePrizeId(id)) if id == "a"));
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let result = PrizeCatalog::new(vec![
            Prize::coin("a", 1, "a.png", 100.0),
            Prize::coin("b", 2, "b.png", 0.0),
        ]);
        assert!(matches!(result, Err(WheelError::InvalidWeight { .. })));

        let result = PrizeCatalog::new(vec![Prize::coin("a", 1, "a.png", f64::NAN)]);
        assert!(matches!(result, Err(WheelError::InvalidWeight { .. })));
    }

    #[test]
    fn test_rejects_bad_sum() {
        let result = PrizeCatalog::new(vec![
            Prize::coin("a", 1, "a.png", 50.0),
            Prize::coin("b", 2, "b.png", 49.9),
        ]);
        assert!(matches!(result, Err(WheelError::WeightSum(_))));

        // Within tolerance is fine
        let result = PrizeCatalog::new(vec![
            Prize::coin("a", 1, "a.png", 50.0),
            Prize::coin("b", 2, "b.png", 50.0 + 1e-9),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_unpayable_prizes() {
        let zero_coin = PrizeCatalog::new(vec![
            Prize::coin("a", 0, "a.png", 50.0),
            Prize::coin("b", 1, "b.png", 50.0),
        ]);
        assert!(matches!(
            zero_coin,
            Err(WheelError::InvalidPrize { id, .. }) if id == "a"
        ));

        let blank_id = PrizeCatalog::new(vec![Prize::coin(" ", 5, "a.png", 100.0)]);
        assert!(matches!(blank_id, Err(WheelError::InvalidPrize { .. })));

        let unnamed_gift = PrizeCatalog::new(vec![Prize::gift("g", "", "g.json", 100.0)]);
        assert!(matches!(unnamed_gift, Err(WheelError::InvalidPrize { .. })));

        let no_asset = PrizeCatalog::new(vec![Prize::gift("g", "Hat", "", 100.0)]);
        assert!(matches!(no_asset, Err(WheelError::InvalidPrize { .. })));
    }

    #[test]
    fn test_json_rejects_unpayable_prizes() {
        let zero = r#"[{"id": "A", "type": "coin", "amount": 0, "visual_asset_ref": "a.png", "weight": 100}]"#;
        assert!(matches!(
            PrizeCatalog::from_json(zero),
            Err(WheelError::InvalidPrize { .. })
        ));

        // Through serde's try_from the error surfaces as a parse error
        let blank = r#"[{"id": "B", "type": "gift", "name": "", "visual_asset_ref": "", "weight": 100}]"#;
        assert!(serde_json::from_str::<PrizeCatalog>(blank).is_err());
        assert!(PrizeCatalog::from_json(blank).is_err());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            PrizeCatalog::new(Vec::new()),
            Err(WheelError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_kind_accessors() {
        let coin = Prize::coin("c", 1500, "c.png", 1.0);
        assert_eq!(coin.amount(), Some(1500));
        assert_eq!(coin.gift_name(), None);
        assert_eq!(coin.label(), "1,500");
        assert_eq!(coin.playback(), Playback::Still);

        let gift = Prize::gift("g", "Crystal", "g.json", 1.0);
        assert_eq!(gift.amount(), None);
        assert_eq!(gift.gift_name(), Some("Crystal"));
        assert_eq!(gift.label(), "Crystal");
        assert_eq!(gift.playback(), Playback::Loop);
    }

    #[test]
    fn test_json_catalog() {
        let json = r#"[
            {"id": "A", "type": "coin", "amount": 5, "visual_asset_ref": "a.png", "weight": 50},
            {"id": "B", "type": "gift", "name": "Hat", "visual_asset_ref": "b.json", "weight": 50}
        ]"#;
        let catalog = PrizeCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("B").and_then(|p| p.gift_name()), Some("Hat"));

        // Validation also runs through serde
        let bad = r#"[{"id": "A", "type": "coin", "amount": 5, "visual_asset_ref": "a.png", "weight": 40}]"#;
        assert!(PrizeCatalog::from_json(bad).is_err());
    }
}
