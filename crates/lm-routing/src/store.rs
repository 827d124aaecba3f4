//! The routing store: one fixed-size ring of slots per train.
//!
//! The allocator side (`push`, `release`) belongs to whoever places trains
//! and feeds routes; the motion core only reads cells, follows handles
//! forward, and stamps lane bits back through [`RoutingStore::stamp_forward`].

use lm_core::RingId;

use crate::handle::{RING_SLOTS, RoutingHandle};
use crate::{RoutingCell, RoutingError, RoutingResult, RoutingSlot};

struct Ring {
    slots:  [RoutingSlot; RING_SLOTS],
    /// Where the next `push` writes.
    cursor: u8,
}

#[derive(Default)]
pub struct RoutingStore {
    rings: Vec<Ring>,
}

impl RoutingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ring (all slots free, cursor at 0).
    pub fn allocate_ring(&mut self) -> RoutingResult<RingId> {
        let id = RingId::try_from(self.rings.len())
            .map_err(|_| RoutingError::TooManyRings)?;
        self.rings.push(Ring { slots: [RoutingSlot::Free; RING_SLOTS], cursor: 0 });
        Ok(id)
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Write `slot` at the ring's cursor and advance it.  Fails if the cursor
    /// has caught up with slots the train still holds.
    pub fn push(&mut self, ring: RingId, slot: RoutingSlot) -> RoutingResult<RoutingHandle> {
        let r = self.rings.get_mut(ring.index()).ok_or(RoutingError::UnknownRing(ring))?;
        let index = r.cursor;
        if r.slots[index as usize] != RoutingSlot::Free {
            return Err(RoutingError::RingFull(ring));
        }
        r.slots[index as usize] = slot;
        r.cursor = ((index as usize + 1) % RING_SLOTS) as u8;
        Ok(RoutingHandle::new(ring, index))
    }

    /// Handle the next `push` on `ring` will write to.
    pub fn cursor(&self, ring: RingId) -> RoutingResult<RoutingHandle> {
        self.rings
            .get(ring.index())
            .map(|r| RoutingHandle::new(ring, r.cursor))
            .ok_or(RoutingError::UnknownRing(ring))
    }

    /// Slot contents.  Unknown rings read as free.
    #[inline]
    pub fn get_routing(&self, handle: RoutingHandle) -> RoutingSlot {
        self.rings
            .get(handle.ring.index())
            .map_or(RoutingSlot::Free, |r| r.slots[handle.index as usize])
    }

    #[inline]
    pub fn set_routing(&mut self, handle: RoutingHandle, slot: RoutingSlot) {
        if let Some(r) = self.rings.get_mut(handle.ring.index()) {
            r.slots[handle.index as usize] = slot;
        }
    }

    /// The cell a component currently stands on.
    ///
    /// # Panics
    ///
    /// If the slot is free or unallocated: a component's handle must never
    /// outlive the cell it points at.
    #[track_caller]
    pub fn current(&self, handle: RoutingHandle) -> RoutingCell {
        match self.get_routing(handle) {
            RoutingSlot::Cell(c) => c,
            other => panic!("routing handle {handle} points at {other:?}"),
        }
    }

    /// Free a slot the train has fully passed.
    pub fn release(&mut self, handle: RoutingHandle) {
        self.set_routing(handle, RoutingSlot::Free);
    }

    /// Release every held slot of a ring and reset its cursor.
    pub fn clear_ring(&mut self, ring: RingId) {
        if let Some(r) = self.rings.get_mut(ring.index()) {
            r.slots = [RoutingSlot::Free; RING_SLOTS];
            r.cursor = 0;
        }
    }

    /// Free every reserved slot between `handle` and the ring's cursor,
    /// `Unallocated` sentinels included, and move the cursor to the slot
    /// right after `handle`, so the next `push` extends the route from
    /// `handle`.  Returns how many slots were dropped.
    pub fn truncate_after(&mut self, handle: RoutingHandle) -> usize {
        let Some(r) = self.rings.get_mut(handle.ring.index()) else { return 0 };
        let end = RoutingHandle::new(handle.ring, r.cursor);
        // A cursor sitting on `handle` itself means nothing is reserved ahead.
        let span = if end == handle { 0 } else { handle.next().distance_to(end) };

        let mut dropped = 0;
        let mut h = handle.next();
        for _ in 0..span {
            let slot = &mut r.slots[h.index as usize];
            if *slot != RoutingSlot::Free {
                *slot = RoutingSlot::Free;
                dropped += 1;
            }
            h = h.next();
        }
        r.cursor = handle.next().index;
        dropped
    }

    #[inline]
    pub fn ring_view(&self, origin: RoutingHandle) -> RingView<'_> {
        RingView { store: self, origin }
    }

    /// Apply `stamp` to up to `n` consecutive allocated cells after `origin`.
    /// The closure receives the 0-based position within the span and the
    /// span length actually available.  Returns how many cells were stamped.
    pub fn stamp_forward(
        &mut self,
        origin: RoutingHandle,
        n:      usize,
        mut stamp: impl FnMut(usize, usize, &mut RoutingCell),
    ) -> usize {
        let span = self.ring_view(origin).forward().take(n).count();
        let mut handle = origin;
        for i in 0..span {
            handle = handle.next();
            if let RoutingSlot::Cell(mut cell) = self.get_routing(handle) {
                stamp(i, span, &mut cell);
                self.set_routing(handle, RoutingSlot::Cell(cell));
            }
        }
        span
    }
}

// ── RingView ──────────────────────────────────────────────────────────────────

/// A restartable window onto the consecutive allocated cells around a handle.
///
/// `forward` starts after the origin and `backward` starts at it.  Both stop
/// at the first slot that is not an allocated cell and never revisit a slot.
#[derive(Copy, Clone)]
pub struct RingView<'a> {
    store:  &'a RoutingStore,
    origin: RoutingHandle,
}

impl<'a> RingView<'a> {
    #[inline]
    pub fn origin(self) -> RoutingHandle {
        self.origin
    }

    /// Cells after the origin, nearest first.
    pub fn forward(self) -> Walk<'a> {
        Walk { store: self.store, next: self.origin.next(), step: RoutingHandle::next, left: RING_SLOTS - 1 }
    }

    /// The origin cell and the cells behind it, nearest first.
    pub fn backward(self) -> Walk<'a> {
        Walk { store: self.store, next: self.origin, step: RoutingHandle::prev, left: RING_SLOTS }
    }

    /// Slot immediately after the origin, allocated or not.
    #[inline]
    pub fn peek_next(self) -> RoutingSlot {
        self.store.get_routing(self.origin.next())
    }
}

/// Iterator behind [`RingView::forward`] and [`RingView::backward`].
pub struct Walk<'a> {
    store: &'a RoutingStore,
    next:  RoutingHandle,
    step:  fn(RoutingHandle) -> RoutingHandle,
    left:  usize,
}

impl Iterator for Walk<'_> {
    type Item = (RoutingHandle, RoutingCell);

    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        let handle = self.next;
        let cell = self.store.get_routing(handle).cell();
        if cell.is_none() {
            self.left = 0;
            return None;
        }
        self.left -= 1;
        self.next = (self.step)(handle);
        cell.map(|c| (handle, c))
    }
}
