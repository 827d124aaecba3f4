//! Unit tests for lm-motion.

#[cfg(test)]
mod helpers {
    use std::ops::Range;

    use lm_core::{MotionConfig, PieceId, SimRng, TilePos, TrainId, TransportMode};
    use lm_routing::{RoutingCell, RoutingSlot, RoutingStore};
    use lm_track::{GeometryTables, ObjectCatalog, PieceKey, TileLayout, pieces};
    use lm_vehicle::{MotionState, TrainBuilder, VehicleStore};

    use crate::{AdvanceOutcome, EffectLog, MotionContext, MotionEngine};

    pub struct Fixture {
        pub geometry: GeometryTables,
        pub objects:  ObjectCatalog,
        pub config:   MotionConfig,
        pub routing:  RoutingStore,
        pub vehicles: VehicleStore,
        pub layout:   TileLayout,
        pub rng:      SimRng,
        pub sink:     EffectLog,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                geometry: GeometryTables::standard().expect("standard catalog"),
                objects:  ObjectCatalog::default(),
                config:   MotionConfig::default(),
                routing:  RoutingStore::new(),
                vehicles: VehicleStore::new(),
                layout:   TileLayout::new(),
                rng:      SimRng::new(7),
                sink:     EffectLog::new(),
            }
        }

        pub fn ctx(&mut self) -> MotionContext<'_, TileLayout, EffectLog> {
            MotionContext {
                geometry: &self.geometry,
                objects:  &self.objects,
                config:   &self.config,
                routing:  &mut self.routing,
                vehicles: &mut self.vehicles,
                network:  &mut self.layout,
                rng:      &mut self.rng,
                sink:     &mut self.sink,
            }
        }

        /// Straight pieces along +x on the given tile columns, at height 0.
        pub fn lay(&mut self, mode: TransportMode, tiles: Range<i32>) {
            for x in tiles {
                self.layout
                    .place_piece(&self.geometry, mode, TilePos::new(x, 0), 0, PieceId(pieces::STRAIGHT), 0)
                    .expect("straight piece");
            }
        }

        pub fn place(&mut self, builder: TrainBuilder, tile_x: i32) -> TrainId {
            builder
                .build(&mut self.vehicles, &mut self.routing, &self.geometry, &mut self.layout, TilePos::new(tile_x, 0).origin(0))
                .expect("train fits")
        }

        /// Reserve `n` more straights ahead of the train's last cell.
        pub fn extend(&mut self, train: TrainId, n: usize) {
            let ring = self.vehicles.trains[train.index()].ring;
            for _ in 0..n {
                self.routing.push(ring, RoutingSlot::Cell(straight())).expect("ring has room");
            }
        }

        pub fn advance(&mut self, train: TrainId, distance: i32) -> AdvanceOutcome {
            let mut ctx = self.ctx();
            MotionEngine::advance(&mut ctx, train, distance)
        }

        pub fn lead(&self, train: TrainId) -> MotionState {
            self.vehicles.motion[self.vehicles.trains[train.index()].lead().index()]
        }
    }

    pub fn straight() -> RoutingCell {
        RoutingCell::new(PieceKey::forward(pieces::STRAIGHT, 0))
    }

    pub fn rail() -> TrainBuilder {
        TrainBuilder::new(TransportMode::Rail)
    }

    pub fn road() -> TrainBuilder {
        TrainBuilder::new(TransportMode::Road)
    }
}

// ── Accumulator ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod accumulator {
    use lm_core::{MotionFlags, Pos3, QUANTUM, TransportMode};
    use lm_routing::RoutingSlot;

    use super::helpers::{Fixture, rail, straight};
    use crate::{STEP_DISTANCE, step_distance};

    #[test]
    fn step_cost_depends_on_changed_axes() {
        let o = Pos3::new(0, 0, 0);
        assert_eq!(step_distance(o, o), 0);
        assert_eq!(step_distance(o, Pos3::new(1, 0, 0)), 0x220C);
        assert_eq!(step_distance(o, Pos3::new(1, 1, 0)), 0x3027);
        assert_eq!(step_distance(o, Pos3::new(1, 1, 1)), 0x3689);
        assert!(STEP_DISTANCE.iter().all(|&d| d < QUANTUM));
    }

    #[test]
    #[should_panic(expected = "points at Free")]
    fn advancing_from_a_freed_cell_panics() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..4);
        let id = f.place(rail().route([straight(); 2]).lead_on(1, 0), 0);
        f.extend(id, 1);
        let handle = f.lead(id).handle;
        f.routing.release(handle);
        f.advance(id, 4 * QUANTUM);
    }

    #[test]
    fn rail_lead_crosses_onto_reserved_piece() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..4);
        let id = f.place(rail().route([straight(); 2]).lead_on(1, 31), 0);
        f.extend(id, 1);

        let out = f.advance(id, QUANTUM);
        assert!(!out.flags.intersects(MotionFlags::NO_ROUTE_FOUND | MotionFlags::CRASHED));

        let lead = f.lead(id);
        assert_eq!(lead.sub_position, 0);
        assert_eq!(lead.origin, Pos3::new(64, 0, 0));
        assert_eq!(lead.position, Pos3::new(64, 16, 0));
        assert_eq!(lead.remainder, QUANTUM - 0x220C);
    }

    #[test]
    fn unallocated_next_cell_stalls_without_moving() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..4);
        let id = f.place(rail().route([straight(); 2]).lead_on(1, 31), 0);
        let ring = f.vehicles.trains[id.index()].ring;
        f.routing.push(ring, RoutingSlot::Unallocated).unwrap();
        let before = f.lead(id);

        let out = f.advance(id, QUANTUM);
        assert_eq!(out.flags, MotionFlags::NO_ROUTE_FOUND);
        assert_eq!(out.remaining, 1);

        let after = f.lead(id);
        assert_eq!(after.position, before.position);
        assert_eq!(after.sub_position, before.sub_position);
        assert_eq!(after.handle, before.handle);
        assert_eq!(after.remainder, QUANTUM - 1);
    }

    #[test]
    fn remainder_just_below_quantum_never_steps() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..4);
        let id = f.place(rail().route([straight(); 3]).lead_on(2, 0), 0);
        let lead = f.vehicles.trains[id.index()].lead();
        f.vehicles.motion[lead.index()].remainder = QUANTUM - 1;
        let before = f.lead(id);

        let out = f.advance(id, 0);
        assert_eq!(out.moved, 0);
        assert!(out.flags.is_empty());
        assert_eq!(f.lead(id), before);
    }

    #[test]
    fn distance_is_conserved_and_remainders_stay_below_quantum() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..40);
        let id = f.place(rail().route([straight(); 3]).lead_on(2, 0), 0);
        f.extend(id, 30);

        for distance in [0, 1, QUANTUM - 1, QUANTUM, 3 * QUANTUM + 17, 100_000, 250_000] {
            let prior = f.lead(id).remainder;
            let out = f.advance(id, distance);
            assert!(out.moved <= distance + prior, "moved {} from {distance} + {prior}", out.moved);
            for &c in &f.vehicles.trains[id.index()].components {
                let rem = f.vehicles.motion[c.index()].remainder;
                assert!((0..QUANTUM).contains(&rem), "remainder {rem} of {c}");
            }
            assert_eq!(f.vehicles.trains[id.index()].lookahead_distance, out.moved);
        }
    }

    #[test]
    fn identical_inputs_replay_identically() {
        fn run() -> (Vec<[u8; 36]>, usize) {
            let mut f = Fixture::new();
            f.lay(TransportMode::Rail, 0..30);
            f.layout.set_level_crossing(lm_core::TilePos::new(3, 0), true);
            let id = f.place(rail().route([straight(); 3]).lead_on(2, 0), 0);
            f.extend(id, 20);
            for k in 0..40 {
                f.advance(id, 9_000 + k * 311);
            }
            let records = (0..f.vehicles.component_count())
                .map(|i| f.vehicles.record(lm_core::ComponentId(i as u16)).to_bytes())
                .collect();
            (records, f.sink.effects.len())
        }
        assert_eq!(run(), run());
    }

    #[test]
    fn tile_index_follows_moves() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..10);
        let id = f.place(rail().route([straight(); 3]).lead_on(2, 0), 0);
        f.extend(id, 5);
        f.advance(id, 40 * 0x220C);

        let lead = f.vehicles.trains[id.index()].lead();
        let tile = f.vehicles.motion[lead.index()].position.tile();
        assert!(f.vehicles.components_on(tile).contains(&lead));
        assert!(!f.sink.effects.is_empty());
    }
}

// ── Transition ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod transition {
    use lm_core::{MotionFlags, PieceId, QUANTUM, TilePos, TransportMode};
    use lm_routing::RoutingSlot;
    use lm_track::{Direction, Occupancy, PieceKey, pieces};
    use lm_vehicle::ControlMode;

    use super::helpers::{Fixture, rail, road, straight};
    use crate::{Crossing, Role, SoundId, cross_boundary};

    #[test]
    fn follower_may_not_pass_the_lead_cell() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..4);
        let id = f.place(rail().route([straight(); 2]).lead_on(1, 31), 0);
        f.extend(id, 1);
        let lead = f.vehicles.trains[id.index()].lead();
        let lead_handle = f.vehicles.motion[lead.index()].handle;
        let bogie = f.vehicles.trains[id.index()].components[1];
        let mut state = f.vehicles.motion[bogie.index()];
        state.handle = lead_handle;

        let mut ctx = f.ctx();
        let result = cross_boundary(&mut ctx, id, bogie, &mut state, Role::Follower { lead_handle });
        assert_eq!(result, Crossing::Blocked(MotionFlags::BLOCKED_BY_LEAD));
    }

    #[test]
    fn unreachable_reservation_reports_no_route() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..3);
        let id = f.place(rail().route([straight(); 2]).lead_on(1, 31), 0);
        let ring = f.vehicles.trains[id.index()].ring;
        let turned = PieceKey::new(PieceId(pieces::STRAIGHT), Direction::new(1, false));
        f.routing.push(ring, RoutingSlot::Cell(lm_routing::RoutingCell::new(turned))).unwrap();

        let out = f.advance(id, QUANTUM);
        assert!(out.flags.contains(MotionFlags::NO_ROUTE_FOUND));
        assert_eq!(f.lead(id).sub_position, 31);
    }

    #[test]
    fn road_lead_waits_for_an_occupied_lane() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..6);
        let a = f.place(road().route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(a, 1);
        // A tram ahead: never overtaken, so the planner leaves it to occupancy.
        f.place(road().spacing(4).route([straight()]).lead_on(0, 16), 3);
        f.vehicles.trains[a.index()].road_kind = lm_core::RoadKind::Tram;

        let out = f.advance(a, QUANTUM);
        assert_eq!(out.flags, MotionFlags::LOOKAHEAD_EXHAUSTED);
        assert_eq!(f.lead(a).sub_position, 31);
    }

    #[test]
    fn manual_control_skips_planning() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..6);
        let a = f.place(road().route([straight(); 3]).lead_on(2, 31).control(ControlMode::Manual { notch: 5 }), 0);
        f.extend(a, 1);
        f.layout.set_level_crossing(TilePos::new(3, 0), true);
        f.layout.set_crossing_closed(TilePos::new(3, 0), true);

        let out = f.advance(a, QUANTUM);
        assert!(out.flags.is_empty());
        assert_eq!(f.lead(a).origin.tile(), TilePos::new(3, 0));
    }

    #[test]
    fn rail_lead_closes_crossing_and_whistles() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..6);
        f.layout.set_level_crossing(TilePos::new(3, 0), true);
        let id = f.place(rail().route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(id, 2);

        let out = f.advance(id, QUANTUM);
        assert!(out.flags.contains(MotionFlags::APPROACHING_GRADE_CROSSING));
        assert!(!out.flags.is_stalled());
        assert!(f.layout.is_crossing_closed(TilePos::new(3, 0)));
        assert_eq!(f.sink.sounds().filter(|s| matches!(s, SoundId::Whistle(_))).count(), 1);
    }

    #[test]
    fn tail_reopens_crossing_it_leaves() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..12);
        f.layout.set_level_crossing(TilePos::new(3, 0), true);
        let id = f.place(rail().route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(id, 8);

        f.advance(id, QUANTUM);
        assert!(f.layout.is_crossing_closed(TilePos::new(3, 0)));
        // Far enough for the tail to leave tile 3 behind.
        for _ in 0..10 {
            f.advance(id, 20 * 0x220C);
        }
        let tail = f.vehicles.trains[id.index()].tail();
        assert!(f.vehicles.motion[tail.index()].origin.tile().x > 3);
        assert!(!f.layout.is_crossing_closed(TilePos::new(3, 0)));
    }

    #[test]
    fn road_tail_releases_lane_claims() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..12);
        let id = f.place(road().route([straight(); 3]).lead_on(2, 0), 0);
        f.extend(id, 6);
        let first = lm_track::PieceDescriptor::new(straight().key);
        assert_eq!(f.layout.lane_claims(TilePos::new(1, 0).origin(0), first), 1);

        for _ in 0..8 {
            f.advance(id, 10 * 0x220C);
        }
        assert_eq!(f.layout.lane_claims(TilePos::new(1, 0).origin(0), first), 0);
    }
}

// ── Planner / overtake ────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use lm_core::{Pos3, QUANTUM, RoadKind, Speed16, TilePos, TrainId, TransportMode};
    use lm_routing::RoutingSlot;
    use lm_track::{Lane, Occupancy, PieceDescriptor};

    use super::helpers::{Fixture, road, straight};
    use crate::{Crossing, OvertakeAvailability, PlanOutcome, Role, cross_boundary, overtake_availability, plan};

    /// A (fast) on tiles 1–2 with `ahead` more cells reserved; B (slow) on
    /// tile `b_tile`.
    fn overtake_setup(ahead: usize, b_tile: i32) -> (Fixture, TrainId, TrainId) {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..20);
        let a = f.place(road().max_speed(Speed16::mph(60)).route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(a, ahead);
        let b = f.place(road().spacing(4).max_speed(Speed16::mph(20)).route([straight()]).lead_on(0, 16), b_tile);
        f.vehicles.trains[a.index()].lookahead_distance = 0x40000;
        f.vehicles.trains[b.index()].lookahead_distance = 0x30000;
        (f, a, b)
    }

    fn plan_for(f: &mut Fixture, a: TrainId) -> PlanOutcome {
        let state = f.lead(a);
        let ctx = f.ctx();
        plan(&ctx, a, &state)
    }

    fn own_lane(tile: i32) -> (Pos3, PieceDescriptor) {
        (TilePos::new(tile, 0).origin(0), PieceDescriptor::new(straight().key))
    }

    #[test]
    fn slower_vehicle_ahead_is_overtakeable() {
        let (mut f, a, _) = overtake_setup(10, 3);
        let (pos, desc) = own_lane(3);
        let ctx = f.ctx();
        assert_eq!(overtake_availability(&ctx, a, pos, desc), OvertakeAvailability::OvertakeAvailable);
    }

    #[test]
    fn faster_vehicle_ahead_may_overtake_us() {
        let (mut f, a, b) = overtake_setup(10, 3);
        f.vehicles.trains[b.index()].max_speed = Speed16::mph(60);
        let (pos, desc) = own_lane(3);
        {
            let ctx = f.ctx();
            assert_eq!(overtake_availability(&ctx, a, pos, desc), OvertakeAvailability::MayBeOvertaken);
        }
        assert_eq!(plan_for(&mut f, a), PlanOutcome::None);
    }

    #[test]
    fn peers_below_committed_distance_or_broken_down_are_skipped() {
        let (mut f, a, b) = overtake_setup(10, 3);
        let (pos, desc) = own_lane(3);
        f.vehicles.trains[b.index()].lookahead_distance = 0x220C0 - 1;
        {
            let ctx = f.ctx();
            assert_eq!(overtake_availability(&ctx, a, pos, desc), OvertakeAvailability::NoOvertakeAvailable);
        }
        f.vehicles.trains[b.index()].lookahead_distance = 0x30000;
        f.vehicles.trains[b.index()].broken_down = true;
        let ctx = f.ctx();
        assert_eq!(overtake_availability(&ctx, a, pos, desc), OvertakeAvailability::NoOvertakeAvailable);
    }

    #[test]
    fn ineligible_blocker_is_passed_after_one_clear_cell() {
        let (mut f, a, b) = overtake_setup(10, 3);
        f.vehicles.trains[b.index()].broken_down = true;
        assert_eq!(plan_for(&mut f, a), PlanOutcome::Overtake(2));

        // Still waits when the opposite lane is taken.
        for tile in 4..13 {
            let (pos, desc) = own_lane(tile);
            f.layout.claim_lane(pos, desc.other_lane());
        }
        assert_eq!(plan_for(&mut f, a), PlanOutcome::None);
    }

    #[test]
    fn obstruction_with_clear_opposite_lane_plans_overtake_of_six() {
        let (mut f, a, _) = overtake_setup(10, 3);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::Overtake(6));
    }

    #[test]
    fn overtake_stamps_are_visible_through_the_ring() {
        let (mut f, a, _) = overtake_setup(10, 3);
        let lead = f.vehicles.trains[a.index()].lead();
        let mut state = f.lead(a);
        let start = state.handle;
        {
            let mut ctx = f.ctx();
            let result = cross_boundary(&mut ctx, a, lead, &mut state, Role::Lead);
            assert!(matches!(result, Crossing::Resolved { moved } if moved > 0));
        }

        let mut lanes = Vec::new();
        let mut h = start;
        for _ in 0..7 {
            h = h.next();
            let cell = f.routing.get_routing(h).cell().expect("reserved");
            lanes.push((cell.overtaking, cell.changing_lane));
        }
        assert_eq!(lanes, vec![
            (false, true),
            (true, false),
            (true, false),
            (true, false),
            (true, false),
            (true, true),
            (false, false),
        ]);

        // Opposite-lane geometry for the middle of the span.
        let middle = f.routing.get_routing(start.next().next()).cell().unwrap().descriptor();
        assert_eq!(middle.lane(), Lane::Opposite);
        assert!(f.geometry.samples(TransportMode::Road, middle).iter().all(|s| s.offset.y == 8));

        assert_eq!(state.origin, Pos3::new(256, 0, 0));
        assert_eq!(state.sub_position, 0);
        assert_eq!(state.descriptor.lane(), Lane::ToOwn);
        assert_eq!(state.position.y, 8);
        let mirror = f.vehicles.trains[a.index()].lane;
        assert!(mirror.overtaking && mirror.changing_lane);
    }

    #[test]
    fn advance_moves_the_lead_through_the_overtake() {
        let (mut f, a, _) = overtake_setup(10, 3);
        let out = f.advance(a, QUANTUM);
        let lead = f.lead(a);
        assert_eq!(lead.origin, Pos3::new(256, 0, 0));
        assert_eq!(lead.descriptor.lane(), Lane::ToOwn);
        // 161 steps from the end of tile 2 to the start of tile 8.
        assert!(out.moved >= 161 * 0x220C);
        assert_eq!(f.vehicles.trains[a.index()].lookahead_distance, out.moved);
    }

    #[test]
    fn occupied_opposite_lane_prevents_overtaking() {
        let (mut f, a, _) = overtake_setup(10, 3);
        for tile in 4..13 {
            let (pos, desc) = own_lane(tile);
            f.layout.claim_lane(pos, desc.other_lane());
        }
        assert_eq!(plan_for(&mut f, a), PlanOutcome::None);
    }

    #[test]
    fn trams_and_vehicles_mid_manoeuvre_never_overtake() {
        let (mut f, a, _) = overtake_setup(10, 3);
        f.vehicles.trains[a.index()].road_kind = RoadKind::Tram;
        assert_eq!(plan_for(&mut f, a), PlanOutcome::None);

        let (mut f, a, _) = overtake_setup(10, 3);
        let lead = f.vehicles.trains[a.index()].lead();
        f.vehicles.motion[lead.index()].descriptor.overtaking = true;
        assert_eq!(plan_for(&mut f, a), PlanOutcome::None);
    }

    #[test]
    fn obstruction_two_cells_ahead_is_detected_early() {
        let (mut f, a, _) = overtake_setup(10, 4);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::Overtake(7));
    }

    #[test]
    fn short_ring_ending_at_station_changes_lane() {
        let (mut f, a, _) = overtake_setup(4, 3);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::None);
        f.layout.set_station(TilePos::new(6, 0), true);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::ChangeLane(4));
    }

    #[test]
    fn level_crossing_is_driven_over_in_one_go() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..12);
        let a = f.place(road().route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(a, 6);
        f.layout.set_level_crossing(TilePos::new(3, 0), true);
        f.layout.set_level_crossing(TilePos::new(4, 0), true);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::LevelCrossing(3));

        f.advance(a, QUANTUM);
        assert_eq!(f.lead(a).origin, Pos3::new(160, 0, 0));
    }

    #[test]
    fn blocked_crossing_means_no_route() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..12);
        let a = f.place(road().route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(a, 6);
        f.layout.set_level_crossing(TilePos::new(3, 0), true);
        f.layout.set_level_crossing(TilePos::new(4, 0), true);
        let (pos, desc) = own_lane(4);
        f.layout.claim_lane(pos, desc);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::NoRoute);

        let out = f.advance(a, QUANTUM);
        assert_eq!(out.flags, lm_core::MotionFlags::LOOKAHEAD_EXHAUSTED);
    }

    #[test]
    fn crossing_running_off_the_ring_means_no_route() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..12);
        let a = f.place(road().route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(a, 2);
        f.layout.set_level_crossing(TilePos::new(3, 0), true);
        f.layout.set_level_crossing(TilePos::new(4, 0), true);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::NoRoute);
    }

    #[test]
    fn clear_road_needs_no_plan() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..12);
        let a = f.place(road().route([straight(); 3]).lead_on(2, 31), 0);
        f.extend(a, 6);
        assert_eq!(plan_for(&mut f, a), PlanOutcome::None);
        let ring = f.vehicles.trains[a.index()].ring;
        assert!(f.routing.cursor(ring).is_ok());
        assert!(matches!(f.routing.get_routing(f.lead(a).handle.next()), RoutingSlot::Cell(_)));
    }
}

// ── Target speed ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod speed {
    use lm_core::{BridgeId, Speed16, Speed32, TrainId, TransportMode};
    use lm_track::{BridgeObject, RoadObject, TrackObject};
    use lm_vehicle::ControlMode;

    use super::helpers::{Fixture, rail, road, straight};
    use crate::{MotionEngine, resolve_target_speed};

    /// Plenty of committed distance so the rate clamp stays out of the way.
    const FAR: i32 = 200 << 15;

    fn rail_fixture(cells: [lm_routing::RoutingCell; 3]) -> (Fixture, TrainId) {
        let mut f = Fixture::new();
        f.objects.tracks.push(TrackObject { curve_speed: Speed16::mph(100) });
        f.objects.bridges.push(BridgeObject { max_speed: Some(Speed16::mph(40)) });
        f.lay(TransportMode::Rail, 0..4);
        let id = f.place(rail().route(cells).lead_on(2, 0), 0);
        f.vehicles.trains[id.index()].lookahead_distance = FAR;
        (f, id)
    }

    fn target(f: &mut Fixture, id: TrainId) -> Speed16 {
        let ctx = f.ctx();
        resolve_target_speed(&ctx, id)
    }

    #[test]
    fn power_cap_bounds_a_straight_run() {
        let (mut f, id) = rail_fixture([straight(); 3]);
        assert_eq!(target(&mut f, id), Speed16::mph(60));
    }

    #[test]
    fn broken_down_rail_runs_at_a_quarter() {
        let (mut f, id) = rail_fixture([straight(); 3]);
        f.vehicles.trains[id.index()].broken_down = true;
        assert_eq!(target(&mut f, id), Speed16::mph(15));
    }

    #[test]
    fn bridge_under_the_train_caps_speed() {
        let (mut f, id) = rail_fixture([straight(), straight().on_bridge(BridgeId(0)), straight()]);
        assert_eq!(target(&mut f, id), Speed16::mph(40));

        f.vehicles.trains[id.index()].faster_around_curves = true;
        assert_eq!(target(&mut f, id), Speed16::mph(50));
    }

    #[test]
    fn rack_rail_applies_its_own_cap() {
        let (mut f, id) = rail_fixture([straight(), straight(), straight().with_rack_rail()]);
        assert_eq!(target(&mut f, id), Speed16::mph(20));
    }

    #[test]
    fn little_committed_distance_limits_the_rate() {
        let (mut f, id) = rail_fixture([straight(); 3]);
        f.vehicles.trains[id.index()].lookahead_distance = 0;
        assert_eq!(target(&mut f, id), Speed16::mph(5));

        f.vehicles.trains[id.index()].lookahead_distance = 30 << 15;
        assert_eq!(target(&mut f, id), Speed16::mph(35));
    }

    #[test]
    fn forced_stop_zeroes_only_when_stationary() {
        let (mut f, id) = rail_fixture([straight(); 3]);
        f.vehicles.trains[id.index()].command_stop = true;
        f.vehicles.trains[id.index()].speed = Speed32::from(Speed16::mph(10));
        assert_eq!(target(&mut f, id), Speed16::mph(60));

        f.vehicles.trains[id.index()].speed = Speed32::ZERO;
        assert_eq!(target(&mut f, id), Speed16::ZERO);

        f.vehicles.trains[id.index()].command_stop = false;
        f.vehicles.trains[id.index()].control = ControlMode::Manual { notch: -20 };
        assert_eq!(target(&mut f, id), Speed16::ZERO);
    }

    #[test]
    fn road_speed_has_a_floor() {
        let mut f = Fixture::new();
        f.objects.roads.push(RoadObject { max_speed: Speed16::mph(10), kind: lm_core::RoadKind::Road });
        f.lay(TransportMode::Road, 0..4);
        let id = f.place(road().route([straight(); 3]).lead_on(2, 0), 0);
        f.vehicles.trains[id.index()].lookahead_distance = FAR;
        assert_eq!(target(&mut f, id), Speed16::mph(12));
    }

    #[test]
    fn unknown_road_object_uses_default_speed() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Road, 0..4);
        let id = f.place(road().max_speed(Speed16::mph(80)).network_object(None).route([straight(); 3]).lead_on(2, 0), 0);
        f.vehicles.trains[id.index()].lookahead_distance = FAR;
        // 60 mph scaled by the straight fraction truncates just below 60.
        assert_eq!(target(&mut f, id), Speed16::mph(59));
    }

    #[test]
    fn update_stores_the_target() {
        let (mut f, id) = rail_fixture([straight(); 3]);
        let mut ctx = f.ctx();
        let t = MotionEngine::update_target_speed(&mut ctx, id);
        assert_eq!(f.vehicles.trains[id.index()].target_speed, t);
    }
}

// ── Crash ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod crash {
    use lm_core::{ComponentId, MotionFlags, Pos3, Speed16, Speed32, TilePos, TransportMode};
    use lm_track::Surface;

    use super::helpers::{Fixture, rail, straight};
    use crate::{MotionEngine, SoundId, VisualEffect, update_wreck};

    #[test]
    fn rear_end_collision_crashes_both_trains() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..12);
        let a = f.place(rail().route([straight(); 3]).lead_on(2, 0).speed(Speed32::from(Speed16::mph(40))), 0);
        f.extend(a, 5);
        let b = f.place(rail().route([straight(); 3]).lead_on(2, 0), 3);

        let out = f.advance(a, 700_000);
        assert!(out.flags.contains(MotionFlags::CRASHED));
        let hit = out.collided.expect("collision recorded");
        assert_eq!(f.vehicles.train_of[hit.index()], b);

        let mut ctx = f.ctx();
        MotionEngine::crash(&mut ctx, a, out.collided);
        for id in [a, b] {
            let t = &f.vehicles.trains[id.index()];
            assert!(t.is_crashed());
            assert_eq!(t.speed, Speed32::ZERO);
            for &c in &t.components {
                let structural = f.vehicles.kind[c.index()].is_structural();
                assert_eq!(f.vehicles.wreck[c.index()].is_destroyed(), structural);
            }
        }
        assert_eq!(f.sink.sounds().filter(|&s| s == SoundId::Explode).count(), 6);
    }

    #[test]
    fn last_train_struck_in_one_advance_is_reported() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..12);
        let a = f.place(rail().route([straight(); 3]).lead_on(2, 0), 0);
        f.extend(a, 9);
        let b = f.place(rail().route([straight(); 3]).lead_on(2, 0), 3);
        let c = f.place(rail().route([straight(); 3]).lead_on(2, 0), 6);

        let out = f.advance(a, 3_000_000);
        assert!(out.flags.contains(MotionFlags::CRASHED));
        let hit = out.collided.expect("collision recorded");
        assert_ne!(f.vehicles.train_of[hit.index()], b);
        assert_eq!(f.vehicles.train_of[hit.index()], c);
    }

    #[test]
    fn crashed_trains_stay_put() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..6);
        let a = f.place(rail().route([straight(); 3]).lead_on(2, 0), 0);
        f.extend(a, 2);
        {
            let mut ctx = f.ctx();
            MotionEngine::crash(&mut ctx, a, None);
        }
        let before = f.lead(a);
        let out = f.advance(a, 50_000);
        assert_eq!(out.flags, MotionFlags::CRASHED);
        assert_eq!(out.remaining, 50_000);
        assert_eq!(f.lead(a), before);
    }

    #[test]
    fn own_neighbours_are_not_collisions() {
        let mut f = Fixture::new();
        f.lay(TransportMode::Rail, 0..12);
        let a = f.place(rail().cars(2).route([straight(); 3]).lead_on(2, 16), 0);
        f.extend(a, 6);
        let out = f.advance(a, 200_000);
        assert!(!out.flags.contains(MotionFlags::CRASHED));
    }

    /// A lone destroyed bogie flying along +x at `z`.
    fn wreck(f: &mut Fixture, z: i32, velocity: u32) -> ComponentId {
        f.lay(TransportMode::Rail, 0..4);
        let id = f.place(rail().route([straight(); 3]).lead_on(2, 0), 0);
        let c = f.vehicles.trains[id.index()].components[1];
        let at = f.vehicles.motion[c.index()].position;
        f.vehicles.set_position(c, Pos3::new(at.x, at.y, z));
        f.vehicles.motion[c.index()].yaw = 0;
        f.vehicles.wreck[c.index()].destroy(velocity);
        c
    }

    fn tick(f: &mut Fixture, c: ComponentId) {
        let mut ctx = f.ctx();
        update_wreck(&mut ctx, c);
    }

    #[test]
    fn wreck_flies_and_slows() {
        let mut f = Fixture::new();
        let c = wreck(&mut f, 100, 0x80_0000);
        let start = f.vehicles.motion[c.index()].position;
        tick(&mut f, c);
        let w = f.vehicles.wreck[c.index()];
        assert_eq!(w.magnitude(), 0xF_C000);
        assert_eq!(w.frac_x, 0xC000);
        assert_eq!(f.vehicles.motion[c.index()].position, Pos3::new(start.x + 15, start.y, 100));
    }

    #[test]
    fn slow_wreck_comes_to_rest() {
        let mut f = Fixture::new();
        let c = wreck(&mut f, 100, 8000 << 3);
        let start = f.vehicles.motion[c.index()].position;
        tick(&mut f, c);
        assert_eq!(f.vehicles.wreck[c.index()].magnitude(), 0);
        assert_eq!(f.vehicles.motion[c.index()].position, start);
    }

    #[test]
    fn wreck_bounces_off_solid_geometry() {
        let mut f = Fixture::new();
        let c = wreck(&mut f, 100, 0x80_0000);
        let start = f.vehicles.motion[c.index()].position;
        f.layout.add_obstacle(Pos3::new(start.x + 15, start.y, 100).tile(), 0, 200);

        tick(&mut f, c);
        let state = f.vehicles.motion[c.index()];
        assert_eq!((state.position.x, state.position.y), (start.x, start.y));
        assert_eq!(state.yaw, 4);
        assert_eq!(f.vehicles.wreck[c.index()].magnitude(), 0xF_C000 / 2);
        assert!(f.vehicles.wreck[c.index()].exploded);
        assert!(f.sink.sounds().any(|s| s == SoundId::Explode));
    }

    #[test]
    fn wall_bounce_still_lands_on_solid_below() {
        let mut f = Fixture::new();
        let c = wreck(&mut f, 100, 0x80_0000);
        let start = f.vehicles.motion[c.index()].position;
        f.layout.add_obstacle(Pos3::new(start.x + 15, start.y, 100).tile(), 0, 200);
        f.layout.add_obstacle(start.tile(), 0, 97);
        f.vehicles.wreck[c.index()].fall = 200;

        tick(&mut f, c);
        assert_eq!(f.vehicles.motion[c.index()].position, start);
        assert_eq!(f.vehicles.wreck[c.index()].fall, 0);
        assert!(f.vehicles.wreck[c.index()].exploded);
    }

    #[test]
    fn wreck_on_the_ground_does_not_slide() {
        let mut f = Fixture::new();
        let c = wreck(&mut f, 0, 0x80_0000);
        let start = f.vehicles.motion[c.index()].position;
        tick(&mut f, c);
        assert_eq!(f.vehicles.motion[c.index()].position, start);
        assert_eq!(f.vehicles.wreck[c.index()].magnitude(), 0xF_C000 / 2);
    }

    #[test]
    fn wreck_splashes_once_into_water() {
        let mut f = Fixture::new();
        let c = wreck(&mut f, 100, 0x80_0000);
        let start = f.vehicles.motion[c.index()].position;
        for x in -1..4 {
            f.layout.set_surface(TilePos::new(x, 0), Surface { land: 0, water: Some(95) });
        }
        f.vehicles.wreck[c.index()].fall = 200;

        tick(&mut f, c);
        assert!(f.vehicles.motion[c.index()].position.z < 95);
        assert!(f.vehicles.wreck[c.index()].splashed);
        tick(&mut f, c);
        assert_eq!(f.sink.visuals().filter(|&v| v == VisualEffect::Splash).count(), 1);
        assert_eq!(f.sink.sounds().filter(|&s| s == SoundId::Splash).count(), 1);
        assert!(f.vehicles.motion[c.index()].position.x > start.x);
    }
}
