//! Fluent builder for constructing a [`Sim`].

use lm_core::{Pos3, SimConfig, SimRng, Tick, TrainId};
use lm_motion::{EffectSink, NoopSink};
use lm_routing::{RoutingCell, RoutingSlot, RoutingStore};
use lm_track::{GeometryTables, ObjectCatalog, TrackNetwork};
use lm_vehicle::{TrainBuilder, VehicleStore};

use crate::feeder::{NoFeeder, RouteFeeder};
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<N, S, F>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — total ticks, seed, traction steps, engine tunables
/// - [`GeometryTables`] — usually [`GeometryTables::standard`]
/// - `N: TrackNetwork` — connections, occupancy and terrain (e.g.
///   [`lm_track::TileLayout`])
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                          |
/// |------------------------|----------------------------------|
/// | `.objects(c)`          | `ObjectCatalog::default()`       |
/// | `.train(b, origin)`    | No trains                        |
/// | `.extra_routes(v)`     | Nothing pushed past each route   |
/// | `.feeder(f)`           | [`NoFeeder`]                     |
/// | `.sink(s)`             | [`NoopSink`]                     |
///
/// Trains get ids in the order they are added, which is also the order the
/// tick loop processes them in.
pub struct SimBuilder<N: TrackNetwork, S: EffectSink = NoopSink, F: RouteFeeder = NoFeeder> {
    config:       SimConfig,
    geometry:     GeometryTables,
    objects:      ObjectCatalog,
    network:      N,
    trains:       Vec<(TrainBuilder, Pos3)>,
    extra_routes: Option<Vec<Vec<RoutingCell>>>,
    feeder:       F,
    sink:         S,
}

impl<N: TrackNetwork> SimBuilder<N> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, geometry: GeometryTables, network: N) -> Self {
        Self {
            config,
            geometry,
            objects:      ObjectCatalog::default(),
            network,
            trains:       Vec::new(),
            extra_routes: None,
            feeder:       NoFeeder,
            sink:         NoopSink,
        }
    }
}

impl<N: TrackNetwork, S: EffectSink, F: RouteFeeder> SimBuilder<N, S, F> {
    pub fn objects(mut self, objects: ObjectCatalog) -> Self {
        self.objects = objects;
        self
    }

    /// Place a train with its first route piece at `origin`.
    pub fn train(mut self, builder: TrainBuilder, origin: Pos3) -> Self {
        self.trains.push((builder, origin));
        self
    }

    /// Cells reserved ahead of each train's own route, one list per train in
    /// the order the trains were added.
    pub fn extra_routes(mut self, routes: Vec<Vec<RoutingCell>>) -> Self {
        self.extra_routes = Some(routes);
        self
    }

    pub fn feeder<F2: RouteFeeder>(self, feeder: F2) -> SimBuilder<N, S, F2> {
        SimBuilder {
            config:       self.config,
            geometry:     self.geometry,
            objects:      self.objects,
            network:      self.network,
            trains:       self.trains,
            extra_routes: self.extra_routes,
            feeder,
            sink:         self.sink,
        }
    }

    pub fn sink<S2: EffectSink>(self, sink: S2) -> SimBuilder<N, S2, F> {
        SimBuilder {
            config:       self.config,
            geometry:     self.geometry,
            objects:      self.objects,
            network:      self.network,
            trains:       self.trains,
            extra_routes: self.extra_routes,
            feeder:       self.feeder,
            sink,
        }
    }

    /// Validate inputs, place every train, and return a ready-to-run [`Sim`].
    pub fn build(mut self) -> SimResult<Sim<N, S, F>> {
        self.config.validate()?;

        let train_count = self.trains.len();
        let routes_len = self.extra_routes.as_ref().map(Vec::len);
        if let Some(got) = routes_len.filter(|&n| n != train_count) {
            return Err(SimError::TrainCountMismatch {
                expected: train_count,
                got,
                what:     "extra routes",
            });
        }

        // ── Place trains ──────────────────────────────────────────────────
        let mut vehicles = VehicleStore::new();
        let mut routing = RoutingStore::new();
        for (builder, origin) in self.trains {
            builder.build(&mut vehicles, &mut routing, &self.geometry, &mut self.network, origin)?;
        }

        // ── Reserve extra cells ahead ─────────────────────────────────────
        if let Some(routes) = self.extra_routes {
            let ids: Vec<TrainId> = vehicles.train_ids().collect();
            for (id, cells) in ids.into_iter().zip(routes) {
                let ring = vehicles.trains[id.index()].ring;
                for cell in cells {
                    routing.push(ring, RoutingSlot::Cell(cell))?;
                }
            }
        }

        Ok(Sim {
            rng:      SimRng::new(self.config.seed),
            now:      Tick::ZERO,
            config:   self.config,
            geometry: self.geometry,
            objects:  self.objects,
            network:  self.network,
            routing,
            vehicles,
            feeder:   self.feeder,
            sink:     self.sink,
        })
    }
}
