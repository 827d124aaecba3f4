//! Unit tests for lm-routing.

#[cfg(test)]
mod cell {
    use lm_core::BridgeId;
    use lm_track::{PieceKey, pieces};

    use crate::{RoutingCell, RoutingError, RoutingSlot};

    #[test]
    fn packed_layout_matches_save_format() {
        let mut cell = RoutingCell::new(PieceKey::forward(pieces::RIGHT_CURVE, 3).reversed())
            .on_bridge(BridgeId(5))
            .with_rack_rail();
        cell.set_lane_bits(true, false);
        // dir 0b111, id 2 << 3, overtaking, bridge 5, bridge flag, rack rail
        let expected = 0b111 | (2 << 3) | (1 << 7) | (5 << 9) | (1 << 12) | (1 << 13);
        assert_eq!(RoutingSlot::Cell(cell).pack(), expected);
    }

    #[test]
    fn unpack_restores_every_field() {
        let cell = RoutingCell::new(PieceKey::forward(pieces::SLOPE_DOWN, 1))
            .with_level_crossing()
            .on_bridge(BridgeId(7));
        let word = RoutingSlot::Cell(cell).pack();
        assert_eq!(RoutingSlot::unpack(word).unwrap(), RoutingSlot::Cell(cell));
    }

    #[test]
    fn sentinels_survive_packing() {
        for slot in [RoutingSlot::Unallocated, RoutingSlot::Free] {
            assert_eq!(RoutingSlot::unpack(slot.pack()).unwrap(), slot);
        }
    }

    #[test]
    fn high_bit_words_rejected() {
        assert!(matches!(RoutingSlot::unpack(0x8001), Err(RoutingError::BadWord(0x8001))));
    }

    #[test]
    fn descriptor_carries_lane_bits() {
        let mut cell = RoutingCell::new(PieceKey::forward(pieces::STRAIGHT, 0));
        cell.set_lane_bits(true, true);
        let d = cell.descriptor();
        assert!(d.overtaking && d.changing_lane);
    }
}

#[cfg(test)]
mod store {
    use lm_track::{PieceKey, pieces};

    use crate::{RING_SLOTS, RoutingCell, RoutingError, RoutingSlot, RoutingStore};

    fn straight(rotation: u8) -> RoutingSlot {
        RoutingSlot::Cell(RoutingCell::new(PieceKey::forward(pieces::STRAIGHT, rotation)))
    }

    #[test]
    fn push_advances_cursor() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let a = store.push(ring, straight(0)).unwrap();
        let b = store.push(ring, straight(1)).unwrap();
        assert_eq!(b, a.next());
        assert_eq!(store.cursor(ring).unwrap(), b.next());
        assert_eq!(store.current(a).key.direction.rotation(), 0);
    }

    #[test]
    fn full_ring_rejects_push() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let first = store.push(ring, straight(0)).unwrap();
        for _ in 1..RING_SLOTS {
            store.push(ring, straight(0)).unwrap();
        }
        assert!(matches!(store.push(ring, straight(0)), Err(RoutingError::RingFull(_))));
        store.release(first);
        assert!(store.push(ring, straight(0)).is_ok());
    }

    #[test]
    fn forward_view_stops_at_unallocated() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let origin = store.push(ring, straight(0)).unwrap();
        store.push(ring, straight(0)).unwrap();
        store.push(ring, straight(0)).unwrap();
        store.push(ring, RoutingSlot::Unallocated).unwrap();
        store.push(ring, straight(0)).unwrap();

        let view = store.ring_view(origin);
        assert_eq!(view.forward().count(), 2);
        // Restartable: a second walk sees the same cells.
        assert_eq!(view.forward().count(), 2);
        assert_eq!(view.peek_next(), straight(0));
    }

    #[test]
    fn backward_view_includes_origin_and_stops_at_free() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let first = store.push(ring, straight(0)).unwrap();
        store.push(ring, straight(1)).unwrap();
        let third = store.push(ring, straight(2)).unwrap();
        store.release(first);

        let behind: Vec<u8> = store
            .ring_view(third)
            .backward()
            .map(|(_, c)| c.key.direction.rotation())
            .collect();
        assert_eq!(behind, [2, 1]);
    }

    #[test]
    fn views_wrap_around_the_ring() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let mut handles = Vec::new();
        for _ in 0..RING_SLOTS {
            handles.push(store.push(ring, straight(0)).unwrap());
        }
        for &h in &handles[..60] {
            store.release(h);
        }
        for _ in 0..3 {
            store.push(ring, straight(3)).unwrap();
        }
        let origin = handles[62];
        assert_eq!(store.ring_view(origin).forward().count(), 4);
        assert_eq!(store.ring_view(origin).forward().last().unwrap().0.index, 2);
    }

    #[test]
    fn full_ring_walk_is_finite() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let origin = store.push(ring, straight(0)).unwrap();
        for _ in 1..RING_SLOTS {
            store.push(ring, straight(0)).unwrap();
        }
        assert_eq!(store.ring_view(origin).forward().count(), RING_SLOTS - 1);
        assert_eq!(store.ring_view(origin).backward().count(), RING_SLOTS);
    }

    #[test]
    fn stamps_are_visible_to_later_reads() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let origin = store.push(ring, straight(0)).unwrap();
        for _ in 0..4 {
            store.push(ring, straight(0)).unwrap();
        }
        let stamped = store.stamp_forward(origin, 3, |i, n, cell| {
            cell.set_lane_bits(i > 0, i == 0 || i == n - 1);
        });
        assert_eq!(stamped, 3);
        let lanes: Vec<(bool, bool)> = store
            .ring_view(origin)
            .forward()
            .map(|(_, c)| (c.overtaking, c.changing_lane))
            .collect();
        assert_eq!(lanes, [(false, true), (true, false), (true, true), (false, false)]);
    }

    #[test]
    fn truncate_rewinds_the_cursor() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let keep = store.push(ring, straight(0)).unwrap();
        for _ in 0..3 {
            store.push(ring, straight(1)).unwrap();
        }
        assert_eq!(store.truncate_after(keep), 3);
        assert_eq!(store.ring_view(keep).forward().count(), 0);
        assert_eq!(store.cursor(ring).unwrap(), keep.next());

        let pushed = store.push(ring, straight(2)).unwrap();
        assert_eq!(pushed, keep.next());
        assert_eq!(store.current(pushed).key.direction.rotation(), 2);
    }

    #[test]
    fn truncate_drops_an_unallocated_sentinel_and_what_follows() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let keep = store.push(ring, straight(0)).unwrap();
        store.push(ring, RoutingSlot::Unallocated).unwrap();
        store.push(ring, straight(1)).unwrap();
        assert_eq!(store.ring_view(keep).forward().count(), 0);

        assert_eq!(store.truncate_after(keep), 2);
        assert_eq!(store.ring_view(keep).peek_next(), RoutingSlot::Free);
        assert_eq!(store.get_routing(keep.next().next()), RoutingSlot::Free);

        store.push(ring, straight(2)).unwrap();
        store.push(ring, straight(3)).unwrap();
        assert_eq!(store.ring_view(keep).forward().count(), 2);
    }

    #[test]
    fn truncate_leaves_slots_behind_the_handle_alone() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let tail = store.push(ring, straight(0)).unwrap();
        let lead = store.push(ring, straight(0)).unwrap();
        assert_eq!(store.truncate_after(lead), 0);
        assert!(matches!(store.get_routing(tail), RoutingSlot::Cell(_)));
        assert!(matches!(store.get_routing(lead), RoutingSlot::Cell(_)));
    }

    #[test]
    #[should_panic(expected = "points at Free")]
    fn current_on_freed_slot_panics() {
        let mut store = RoutingStore::new();
        let ring = store.allocate_ring().unwrap();
        let h = store.push(ring, straight(0)).unwrap();
        store.release(h);
        let _ = store.current(h);
    }
}
