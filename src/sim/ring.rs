//! Slot ring with conveyor-belt recycling
//!
//! Strip coordinates: x = 0 is the viewport's left edge. The slot at ring
//! position `k` has its left edge at `k * pitch - offset`, so the lead slot
//! (position 0) sits partly or wholly left of the viewport. Once the offset
//! reaches one pitch the lead slot is fully out of view and moves to the tail.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::Prize;
use super::visual::VisualSampler;

/// Strip layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotGeometry {
    pub slot_width: f64,
    pub gap: f64,
    pub viewport_width: f64,
}

impl SlotGeometry {
    /// Distance between consecutive slot origins
    #[inline]
    pub fn pitch(&self) -> f64 {
        self.slot_width + self.gap
    }

    /// Viewport center on the strip
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.viewport_width / 2.0
    }

    /// Body center of the slot at ring `position`
    #[inline]
    pub fn slot_center(&self, position: usize, offset: f64) -> f64 {
        position as f64 * self.pitch() - offset + self.slot_width / 2.0
    }

    /// Offset that puts some slot body exactly on the viewport center
    pub fn centered_offset(&self) -> f64 {
        (self.slot_width / 2.0 - self.center_x()).rem_euclid(self.pitch())
    }
}

/// One element of the strip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Stable identity, never changes while the slot moves around the ring
    pub id: u32,
    /// Prize currently rendered (None only before first population)
    pub prize: Option<Prize>,
    /// Content changed since the presenter last saw it
    #[serde(skip)]
    pub dirty: bool,
}

impl Slot {
    fn assign(&mut self, prize: Prize) {
        self.prize = Some(prize);
        self.dirty = true;
    }
}

/// Fixed-size ring of slots in scroll order (front = lead)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRecycler {
    slots: VecDeque<Slot>,
    geometry: SlotGeometry,
    /// Local scroll offset within the lead slot's pitch
    offset: f64,
}

impl SlotRecycler {
    pub fn new(size: usize, geometry: SlotGeometry) -> Self {
        let slots = (0..size as u32)
            .map(|id| Slot {
                id,
                prize: None,
                dirty: false,
            })
            .collect();
        Self {
            slots,
            geometry,
            offset: geometry.centered_offset(),
        }
    }

    /// Give every slot an initial cosmetic prize
    pub fn populate<R: Rng + ?Sized>(&mut self, sampler: &VisualSampler, rng: &mut R) {
        for slot in &mut self.slots {
            slot.assign(sampler.select_visual_prize(rng).clone());
        }
    }

    /// Scroll the strip by `distance`, recycling slots that leave the view.
    ///
    /// Slots recycled forward get a fresh visual prize unless `spinning`.
    /// Negative distances move tail slots back to the lead and never reassign.
    /// Returns the ids of recycled slots in recycle order; a move of a full lap
    /// or more reports each slot once. Cost is bounded by the ring size.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        distance: f64,
        spinning: bool,
        sampler: &VisualSampler,
        rng: &mut R,
    ) -> Vec<u32> {
        let len = self.slots.len();
        let pitch = self.geometry.pitch();
        if len == 0 || !distance.is_finite() {
            return Vec::new();
        }

        let raw = self.offset + distance;
        let mut offset = raw.rem_euclid(pitch);
        // rem_euclid may round up to exactly `pitch`
        if offset >= pitch {
            offset = 0.0;
        }
        let pitches = ((raw - offset) / pitch).round();
        self.offset = offset;

        let recycled = if pitches > 0.0 {
            self.recycle_forward(pitches, spinning, sampler, rng)
        } else if pitches < 0.0 {
            self.recycle_backward(-pitches)
        } else {
            Vec::new()
        };

        if !recycled.is_empty() {
            log::trace!("Recycled slots {:?}", recycled);
        }
        recycled
    }

    /// Lead slots to the tail, `pitches` times
    fn recycle_forward<R: Rng + ?Sized>(
        &mut self,
        pitches: f64,
        spinning: bool,
        sampler: &VisualSampler,
        rng: &mut R,
    ) -> Vec<u32> {
        let len = self.slots.len();
        let moved = if pitches >= len as f64 {
            // Whole laps leave the order unchanged; every slot was recycled
            // and the last pass ends in the final order
            self.slots.rotate_left((pitches % len as f64) as usize);
            len
        } else {
            let moved = pitches as usize;
            self.slots.rotate_left(moved);
            moved
        };

        let mut recycled = Vec::with_capacity(moved);
        for slot in self.slots.iter_mut().skip(len - moved) {
            if !spinning {
                slot.assign(sampler.select_visual_prize(rng).clone());
            }
            recycled.push(slot.id);
        }
        recycled
    }

    /// Tail slots back to the lead, `pitches` times
    fn recycle_backward(&mut self, pitches: f64) -> Vec<u32> {
        let len = self.slots.len();
        let moved = if pitches >= len as f64 {
            self.slots.rotate_right((pitches % len as f64) as usize);
            len
        } else {
            let moved = pitches as usize;
            self.slots.rotate_right(moved);
            moved
        };
        // Last one moved is now at the lead
        self.slots.iter().take(moved).rev().map(|s| s.id).collect()
    }

    /// Force a slot's content (plants the real prize ahead of a landing)
    pub fn set_slot_prize(&mut self, slot_id: u32, prize: Prize) -> bool {
        match self.slots.iter_mut().find(|s| s.id == slot_id) {
            Some(slot) => {
                slot.assign(prize);
                true
            }
            None => false,
        }
    }

    /// Slot whose body center is nearest the viewport center, with the
    /// signed residual `slot_center - center_x`
    pub fn nearest_to_center(&self) -> Option<(usize, f64)> {
        let center = self.geometry.center_x();
        (0..self.slots.len())
            .map(|position| {
                let residual = self.geometry.slot_center(position, self.offset) - center;
                (position, residual)
            })
            .min_by(|a, b| {
                a.1.abs()
                    .partial_cmp(&b.1.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn slot_at(&self, position: usize) -> Option<&Slot> {
        self.slots.get(position)
    }

    pub fn position_of(&self, slot_id: u32) -> Option<usize> {
        self.slots.iter().position(|s| s.id == slot_id)
    }

    pub fn prize_of(&self, slot_id: u32) -> Option<&Prize> {
        self.slots
            .iter()
            .find(|s| s.id == slot_id)
            .and_then(|s| s.prize.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }
}
