use lm_core::RingId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("ring {0} has no free slot at its write cursor")]
    RingFull(RingId),

    #[error("ring {0} does not exist")]
    UnknownRing(RingId),

    #[error("routing store is out of ring ids")]
    TooManyRings,

    #[error("packed routing word {0:#06x} is not a valid cell")]
    BadWord(u16),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
