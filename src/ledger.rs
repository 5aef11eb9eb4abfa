//! Wallet collaborator
//!
//! Currency balance with an animated display counter, an append-only gift
//! inventory and a bounded tray of win toasts. Owned state, passed by `&mut`.

use serde::{Deserialize, Serialize};

use crate::ease_out_cubic;
use crate::present::ResolutionSink;
use crate::sim::catalog::{Prize, PrizeKind};

/// Duration of the balance count-up (ms)
pub const COUNTER_ANIMATION_MS: f64 = 1000.0;
/// Maximum number of toasts shown at once
pub const MAX_NOTIFICATIONS: usize = 15;
/// Toast lifetime (ms)
pub const NOTIFICATION_LIFETIME_MS: f64 = 20_000.0;

/// Where the engine pays out
pub trait Ledger {
    fn credit_currency(&mut self, amount: u64);
    fn add_inventory_item(&mut self, prize: &Prize);
}

/// Format an amount with thousands separators
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Balance plus the value currently shown on the counter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyCounter {
    balance: u64,
    /// Displayed value when the running animation started
    from: u64,
    elapsed_ms: f64,
    animating: bool,
}

impl CurrencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to the balance and count the display up from where it is now
    pub fn credit(&mut self, amount: u64) {
        self.from = self.displayed();
        self.balance = self.balance.saturating_add(amount);
        self.elapsed_ms = 0.0;
        self.animating = true;
    }

    /// Advance the display animation
    pub fn tick(&mut self, dt_ms: f64) {
        if !self.animating {
            return;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= COUNTER_ANIMATION_MS {
            self.animating = false;
        }
    }

    /// Value to show right now (floored)
    pub fn displayed(&self) -> u64 {
        if !self.animating {
            return self.balance;
        }
        let progress = ease_out_cubic(self.elapsed_ms / COUNTER_ANIMATION_MS);
        let span = (self.balance - self.from) as f64;
        self.from + (span * progress).floor() as u64
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }
}

/// A collected gift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub prize_id: String,
    pub name: String,
    pub visual_asset_ref: String,
    /// Wallet clock (ms) when collected
    pub acquired_at_ms: f64,
}

/// A transient win notice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub id: u32,
    pub message: String,
    pub remaining_ms: f64,
}

/// Bounded list of toasts, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationTray {
    pub toasts: Vec<Toast>,
    next_id: u32,
}

impl NotificationTray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toast. Returns its id, or None when the tray is full.
    pub fn push(&mut self, message: impl Into<String>) -> Option<u32> {
        if self.toasts.len() >= MAX_NOTIFICATIONS {
            log::info!("Maximum notifications reached");
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            message: message.into(),
            remaining_ms: NOTIFICATION_LIFETIME_MS,
        });
        Some(id)
    }

    /// Expire toasts whose lifetime ran out
    pub fn tick(&mut self, dt_ms: f64) {
        for toast in &mut self.toasts {
            toast.remaining_ms -= dt_ms;
        }
        self.toasts.retain(|t| t.remaining_ms > 0.0);
    }

    pub fn dismiss(&mut self, id: u32) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Reference resolution sink: coins to the counter, gifts to the inventory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub currency: CurrencyCounter,
    pub inventory: Vec<InventoryEntry>,
    pub tray: NotificationTray,
    clock_ms: f64,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance counter animation and toast expiry
    pub fn tick(&mut self, dt_ms: f64) {
        self.clock_ms += dt_ms;
        self.currency.tick(dt_ms);
        self.tray.tick(dt_ms);
    }

    pub fn balance(&self) -> u64 {
        self.currency.balance()
    }
}

impl Ledger for Wallet {
    fn credit_currency(&mut self, amount: u64) {
        self.currency.credit(amount);
    }

    fn add_inventory_item(&mut self, prize: &Prize) {
        self.inventory.push(InventoryEntry {
            prize_id: prize.id.clone(),
            name: prize.gift_name().unwrap_or(&prize.id).to_string(),
            visual_asset_ref: prize.visual_asset_ref.clone(),
            acquired_at_ms: self.clock_ms,
        });
    }
}

impl ResolutionSink for Wallet {
    fn on_prize_resolved(&mut self, prize: &Prize) {
        match &prize.kind {
            PrizeKind::Coin { amount } => {
                self.credit_currency(*amount);
                self.tray.push(format!("+{} coins", format_amount(*amount)));
            }
            PrizeKind::Gift { name } => {
                self.add_inventory_item(prize);
                self.tray.push(format!("New item: {name}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1,000");
        assert_eq!(format_amount(1234567), "1,234,567");
    }

    #[test]
    fn test_counter_animation() {
        let mut counter = CurrencyCounter::new();
        counter.credit(200);
        assert_eq!(counter.balance(), 200);
        assert_eq!(counter.displayed(), 0);

        counter.tick(500.0);
        let mid = counter.displayed();
        // Ease-out cubic: 87.5% of the way at the halfway mark
        assert_eq!(mid, 175);

        counter.tick(500.0);
        assert!(!counter.is_animating());
        assert_eq!(counter.displayed(), 200);
    }

    #[test]
    fn test_counter_restarts_from_displayed() {
        let mut counter = CurrencyCounter::new();
        counter.credit(100);
        counter.tick(500.0);
        let shown = counter.displayed();

        counter.credit(100);
        assert_eq!(counter.balance(), 200);
        assert_eq!(counter.displayed(), shown);
        counter.tick(COUNTER_ANIMATION_MS);
        assert_eq!(counter.displayed(), 200);
    }

    #[test]
    fn test_tray_capacity() {
        let mut tray = NotificationTray::new();
        for i in 0..MAX_NOTIFICATIONS {
            assert!(tray.push(format!("toast {i}")).is_some());
        }
        assert!(tray.push("overflow").is_none());
        assert_eq!(tray.len(), MAX_NOTIFICATIONS);
    }

    #[test]
    fn test_tray_expiry_and_dismiss() {
        let mut tray = NotificationTray::new();
        let first = tray.push("a").unwrap();
        tray.tick(10_000.0);
        let second = tray.push("b").unwrap();

        assert!(tray.dismiss(second));
        assert!(!tray.dismiss(second));

        tray.tick(10_000.0);
        assert!(tray.is_empty(), "toast {first} should have expired");
    }

    #[test]
    fn test_wallet_routes_prizes() {
        let mut wallet = Wallet::new();
        wallet.on_prize_resolved(&Prize::coin("coin_250", 250, "c.png", 7.0));
        wallet.tick(100.0);
        wallet.on_prize_resolved(&Prize::gift("gift_crystal", "Crystal", "g.json", 4.0));

        assert_eq!(wallet.balance(), 250);
        assert_eq!(wallet.inventory.len(), 1);
        assert_eq!(wallet.inventory[0].name, "Crystal");
        assert_eq!(wallet.inventory[0].acquired_at_ms, 100.0);
        assert_eq!(wallet.tray.len(), 2);
        assert_eq!(wallet.tray.toasts[0].message, "+250 coins");
    }
}
