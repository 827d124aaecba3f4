//! Fluent builder that places one train onto a route.
//!
//! # Usage
//!
//! ```ignore
//! let straight = RoutingCell::new(PieceKey::forward(pieces::STRAIGHT, 0));
//! let train = TrainBuilder::new(TransportMode::Rail)
//!     .max_speed(Speed16::mph(80))
//!     .route([straight; 4])
//!     .lead_on(2, 4)
//!     .build(&mut vehicles, &mut routing, &geometry, &mut layout, TilePos::new(0, 0).origin(0))?;
//! ```
//!
//! `route` lists the pieces from the rearmost forward.  Pieces from the
//! tail's piece onward are pushed into a fresh ring; pieces ahead of the lead
//! stay reserved for it.  Followers sit `spacing` samples apart behind the
//! lead.

use lm_core::{CompanyId, Pos3, RoadKind, Speed16, Speed32, TrainId, TransportMode};
use lm_routing::{RoutingCell, RoutingSlot, RoutingStore};
use lm_track::{GeometryTables, Occupancy, TrackError};
use smallvec::SmallVec;

use crate::state::MotionState;
use crate::store::VehicleStore;
use crate::train::{ComponentKind, ControlMode, LaneBits, Train, TrainStatus};
use crate::{VehicleError, VehicleResult};

pub const DEFAULT_SPACING: usize = 8;

pub struct TrainBuilder {
    mode:                 TransportMode,
    road_kind:            RoadKind,
    owner:                CompanyId,
    cars:                 usize,
    spacing:              usize,
    max_speed:            Speed16,
    rack_rail_max_speed:  Speed16,
    faster_around_curves: bool,
    network_object:       Option<u8>,
    control:              ControlMode,
    speed:                Speed32,
    route:                Vec<RoutingCell>,
    lead:                 Option<(usize, u16)>,
}

impl TrainBuilder {
    pub fn new(mode: TransportMode) -> Self {
        Self {
            mode,
            road_kind:            RoadKind::Road,
            owner:                CompanyId(0),
            cars:                 1,
            spacing:              DEFAULT_SPACING,
            max_speed:            Speed16::mph(60),
            rack_rail_max_speed:  Speed16::mph(20),
            faster_around_curves: false,
            network_object:       Some(0),
            control:              ControlMode::Automatic,
            speed:                Speed32::ZERO,
            route:                Vec::new(),
            lead:                 None,
        }
    }

    pub fn road_kind(mut self, kind: RoadKind) -> Self {
        self.road_kind = kind;
        self
    }

    pub fn owner(mut self, owner: CompanyId) -> Self {
        self.owner = owner;
        self
    }

    /// Cars between lead and tail, each a bogie-body-bogie triple.
    pub fn cars(mut self, cars: usize) -> Self {
        self.cars = cars;
        self
    }

    /// Samples between consecutive components.
    pub fn spacing(mut self, samples: usize) -> Self {
        self.spacing = samples;
        self
    }

    pub fn max_speed(mut self, speed: Speed16) -> Self {
        self.max_speed = speed;
        self
    }

    pub fn rack_rail_max_speed(mut self, speed: Speed16) -> Self {
        self.rack_rail_max_speed = speed;
        self
    }

    pub fn faster_around_curves(mut self, yes: bool) -> Self {
        self.faster_around_curves = yes;
        self
    }

    pub fn network_object(mut self, object: Option<u8>) -> Self {
        self.network_object = object;
        self
    }

    pub fn control(mut self, control: ControlMode) -> Self {
        self.control = control;
        self
    }

    pub fn speed(mut self, speed: Speed32) -> Self {
        self.speed = speed;
        self
    }

    pub fn route(mut self, cells: impl IntoIterator<Item = RoutingCell>) -> Self {
        self.route = cells.into_iter().collect();
        self
    }

    /// Put the lead on `route[cell]` at sample `sample`.  Defaults to the
    /// first sample of the last piece.
    pub fn lead_on(mut self, cell: usize, sample: u16) -> Self {
        self.lead = Some((cell, sample));
        self
    }

    fn kinds(&self) -> Vec<ComponentKind> {
        let mut kinds = vec![ComponentKind::Lead];
        for _ in 0..self.cars {
            kinds.extend([ComponentKind::Bogie, ComponentKind::Body, ComponentKind::Bogie]);
        }
        kinds.push(ComponentKind::Tail);
        kinds
    }

    /// Place the train with `route[0]`'s origin at `origin`.
    pub fn build(
        self,
        vehicles: &mut VehicleStore,
        routing:  &mut RoutingStore,
        geometry: &GeometryTables,
        network:  &mut impl Occupancy,
        origin:   Pos3,
    ) -> VehicleResult<TrainId> {
        if self.route.is_empty() {
            return Err(VehicleError::EmptyRoute);
        }
        let table = geometry.table(self.mode);
        let (lead_cell, lead_sample) = self.lead.unwrap_or((self.route.len() - 1, 0));
        let lead_cell = lead_cell.min(self.route.len() - 1);

        // Piece origins, chained through exits.
        let mut origins = Vec::with_capacity(self.route.len());
        let mut at = origin;
        for cell in &self.route {
            origins.push(at);
            let exit = table.exit(cell.key).ok_or(TrackError::UnknownPiece(cell.key))?;
            at = at + exit.delta;
        }

        // Every sample from the start of the route up to the lead, in order.
        let mut path: Vec<(usize, u16)> = Vec::new();
        for (i, cell) in self.route.iter().enumerate().take(lead_cell + 1) {
            let len = table.samples(cell.descriptor()).len() as u16;
            let end = if i == lead_cell { (lead_sample + 1).min(len) } else { len };
            path.extend((0..end).map(|j| (i, j)));
        }

        let kinds = self.kinds();
        let needed = (kinds.len() - 1) * self.spacing + 1;
        if path.len() < needed {
            return Err(VehicleError::RouteTooShort { needed, got: path.len() });
        }
        let slots: Vec<(usize, u16)> =
            (0..kinds.len()).map(|k| path[path.len() - 1 - k * self.spacing]).collect();
        let tail_cell = slots[slots.len() - 1].0;

        let ring = routing.allocate_ring()?;
        let mut handles = Vec::with_capacity(self.route.len());
        for cell in &self.route[tail_cell..] {
            handles.push(routing.push(ring, RoutingSlot::Cell(*cell))?);
        }

        if self.mode.is_road() {
            for i in tail_cell..=lead_cell {
                network.claim_lane(origins[i], self.route[i].descriptor());
            }
        }

        let lead_descriptor = self.route[lead_cell].descriptor();
        let train = Train {
            mode:                 self.mode,
            road_kind:            self.road_kind,
            owner:                self.owner,
            ring,
            components:           SmallVec::new(),
            status:               TrainStatus::Running,
            speed:                self.speed,
            target_speed:         Speed16::ZERO,
            max_speed:            self.max_speed,
            rack_rail_max_speed:  self.rack_rail_max_speed,
            faster_around_curves: self.faster_around_curves,
            network_object:       self.network_object,
            control:              self.control,
            command_stop:         false,
            broken_down:          false,
            lookahead_distance:   0,
            lane:                 LaneBits {
                overtaking:    lead_descriptor.overtaking,
                changing_lane: lead_descriptor.changing_lane,
            },
        };
        let id = vehicles.push_train(train)?;

        for (k, (&kind, &(cell, sample))) in kinds.iter().zip(&slots).enumerate() {
            let descriptor = self.route[cell].descriptor();
            let s = table.samples(descriptor)[sample as usize];
            let motion = MotionState {
                position: origins[cell] + s.offset,
                origin: origins[cell],
                descriptor,
                sub_position: sample,
                handle: handles[cell - tail_cell],
                remainder: 0,
                yaw: s.yaw,
                pitch: s.pitch,
                flags: Default::default(),
            };
            let c = vehicles.push_component(kind, id, k as u8, motion)?;
            vehicles.trains[id.index()].components.push(c);
        }
        Ok(id)
    }
}
