//! The `Sim` struct and its tick loop.

use log::debug;

use lm_core::{MotionFlags, SimConfig, SimRng, Speed16, Speed32, Tick, TrainId};
use lm_motion::{AdvanceOutcome, EffectSink, MotionContext, MotionEngine};
use lm_routing::{RoutingCell, RoutingSlot, RoutingStore};
use lm_track::{GeometryTables, ObjectCatalog, TrackNetwork};
use lm_vehicle::{TrainStatus, VehicleStore};

use crate::feeder::{MIN_CELLS_AHEAD, RouteFeeder};
use crate::{SimError, SimObserver, SimResult, TickStats};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<N, S, F>` owns the world and drives the per-train tick loop described
/// in the crate docs.  Trains are processed in ascending `TrainId` order; that
/// order decides who wins a contested lane or crossing.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<N: TrackNetwork, S: EffectSink, F: RouteFeeder> {
    /// Global configuration (total ticks, seed, traction steps, tunables).
    pub config: SimConfig,

    /// The next tick to be processed.
    pub now: Tick,

    pub geometry: GeometryTables,
    pub objects:  ObjectCatalog,

    /// Connections, occupancy and terrain.  Lane claims and crossing state
    /// written by one train are read by the next.
    pub network: N,

    /// One ring per train.
    pub routing: RoutingStore,

    /// Component SoA arrays and the train table.
    pub vehicles: VehicleStore,

    /// Shared RNG for whistle variants.  Seeded from `config.seed`.
    pub rng: SimRng,

    pub feeder: F,
    pub sink:   S,
}

impl<N: TrackNetwork, S: EffectSink, F: RouteFeeder> Sim<N, S, F> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.total_ticks`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.now.0 < self.config.total_ticks {
            self.step(observer);
        }
        observer.on_sim_end(self.now);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores
    /// `total_ticks`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer);
        }
        Ok(())
    }

    /// Replace everything ahead of `train`'s lead with `cells` and wake the
    /// train if it was stuck.  Returns how many cells were pushed.
    pub fn reissue_route(
        &mut self,
        train: TrainId,
        cells: impl IntoIterator<Item = RoutingCell>,
    ) -> SimResult<usize> {
        let t = self.vehicles.train(train).ok_or(SimError::UnknownTrain(train))?;
        let ring = t.ring;
        let lead = t.lead();
        let handle = self.vehicles.motion[lead.index()].handle;

        let dropped = self.routing.truncate_after(handle);
        let mut pushed = 0;
        for cell in cells {
            self.routing.push(ring, RoutingSlot::Cell(cell))?;
            pushed += 1;
        }

        let t = &mut self.vehicles.trains[train.index()];
        if t.status == TrainStatus::Stuck {
            t.status = TrainStatus::Running;
        }
        debug!("{train}: route reissued, {dropped} dropped, {pushed} pushed");
        Ok(pushed)
    }

    /// Borrow the world for one motion call.
    pub fn motion_context(&mut self) -> MotionContext<'_, N, S> {
        MotionContext {
            geometry: &self.geometry,
            objects:  &self.objects,
            config:   &self.config.motion,
            routing:  &mut self.routing,
            vehicles: &mut self.vehicles,
            network:  &mut self.network,
            rng:      &mut self.rng,
            sink:     &mut self.sink,
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.now;
        observer.on_tick_start(now);
        let stats = self.process_tick(now, observer);
        observer.on_tick_end(now, &stats);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.vehicles);
        }
        self.now = now.next();
    }

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> TickStats {
        let mut stats = TickStats::default();
        let trains: Vec<TrainId> = self.vehicles.train_ids().collect();

        for train in trains {
            // ── Wrecks only fly ───────────────────────────────────────────
            if self.vehicles.trains[train.index()].is_crashed() {
                MotionEngine::update_wrecks(&mut self.motion_context(), train);
                continue;
            }

            // ── Route feeding ─────────────────────────────────────────────
            self.feed(train);
            if self.vehicles.trains[train.index()].status == TrainStatus::Stuck {
                stats.stalled += 1;
                continue;
            }

            // ── Target speed and traction ─────────────────────────────────
            let target = MotionEngine::update_target_speed(&mut self.motion_context(), train);
            let distance = self.apply_traction(train, target);

            // ── Advance ───────────────────────────────────────────────────
            let outcome = MotionEngine::advance(&mut self.motion_context(), train, distance);
            if outcome.moved > 0 {
                stats.moved += 1;
            }
            self.react(now, train, outcome, observer, &mut stats);
        }

        stats.crashed = self.vehicles.trains.iter().filter(|t| t.is_crashed()).count();
        stats
    }

    /// Push more cells when the lead is close to the end of its reserved
    /// route, and resume a stuck train once something arrives.
    fn feed(&mut self, train: TrainId) {
        let t = &self.vehicles.trains[train.index()];
        let ring = t.ring;
        let stuck = t.status == TrainStatus::Stuck;
        let handle = self.vehicles.motion[t.lead().index()].handle;
        let ahead = self.routing.ring_view(handle).forward().count();
        if ahead >= MIN_CELLS_AHEAD && !stuck {
            return;
        }

        // A stuck lead facing the allocator's sentinel gets the sentinel and
        // anything queued behind it dropped, so the feeder writes from there.
        if stuck && self.routing.ring_view(handle).peek_next() == RoutingSlot::Unallocated {
            let dropped = self.routing.truncate_after(handle);
            debug!("{train}: dropped {dropped} slots from the unallocated sentinel on");
        }

        let fed = self.feeder.feed(train, ring, &mut self.routing);
        if stuck && fed > 0 {
            self.vehicles.trains[train.index()].status = TrainStatus::Running;
            debug!("{train}: resumed after {fed} cells were fed");
        }
    }

    /// Move the train's speed one step toward `target` and return this
    /// tick's travel distance.
    fn apply_traction(&mut self, train: TrainId, target: Speed16) -> i32 {
        let stop_notch = self.config.motion.manual_stop_notch;
        let (accel, brake) = (self.config.acceleration.0, self.config.braking.0);
        let t = &mut self.vehicles.trains[train.index()];

        let goal = if t.is_forced_stop(stop_notch) { Speed32::ZERO } else { Speed32::from(target) };
        t.speed = if t.speed < goal {
            Speed32(t.speed.0.saturating_add(accel).min(goal.0))
        } else {
            Speed32(t.speed.0.saturating_sub(brake).max(goal.0))
        };
        t.speed.distance_per_tick()
    }

    fn react<O: SimObserver>(
        &mut self,
        now:      Tick,
        train:    TrainId,
        outcome:  AdvanceOutcome,
        observer: &mut O,
        stats:    &mut TickStats,
    ) {
        if outcome.flags.contains(MotionFlags::CRASHED) {
            MotionEngine::crash(&mut self.motion_context(), train, outcome.collided);
            let other = outcome
                .collided
                .map(|c| self.vehicles.train_of[c.index()])
                .filter(|&o| o != train);
            observer.on_crash(now, train, other);
            return;
        }

        if !outcome.flags.is_stalled() {
            return;
        }
        stats.stalled += 1;
        let t = &mut self.vehicles.trains[train.index()];
        t.speed = Speed32::ZERO;
        if outcome.flags.contains(MotionFlags::NO_ROUTE_FOUND) {
            t.status = TrainStatus::Stuck;
            debug!("{train}: stuck at {now}, no route ahead");
            observer.on_stuck(now, train);
        }
    }
}
