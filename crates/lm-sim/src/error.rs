use lm_core::{CoreError, TrainId};
use lm_routing::RoutingError;
use lm_track::TrackError;
use lm_vehicle::VehicleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("{what} length {got} does not match train count {expected}")]
    TrainCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("train {0} does not exist")]
    UnknownTrain(TrainId),

    #[error("track error: {0}")]
    Track(#[from] TrackError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("vehicle error: {0}")]
    Vehicle(#[from] VehicleError),
}

pub type SimResult<T> = Result<T, SimError>;
