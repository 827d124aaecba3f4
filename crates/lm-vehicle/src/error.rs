use lm_routing::RoutingError;
use lm_track::TrackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("a train needs at least one starting cell")]
    EmptyRoute,

    #[error("{needed} samples of track needed behind the lead, only {got} reserved")]
    RouteTooShort { needed: usize, got: usize },

    #[error("component id space exhausted")]
    TooManyComponents,

    #[error("motion record is {0} bytes, expected {expected}", expected = crate::state::MotionRecord::LEN)]
    BadRecord(usize),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Track(#[from] TrackError),
}

pub type VehicleResult<T> = Result<T, VehicleError>;
