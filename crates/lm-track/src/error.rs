use lm_core::PieceId;
use thiserror::Error;

use crate::PieceKey;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("invalid geometry for {key}: {reason}")]
    Geometry { key: PieceKey, reason: String },

    #[error("piece id {0} does not fit the packed routing field")]
    PieceIdOutOfRange(PieceId),

    #[error("piece id {0} defined twice")]
    DuplicatePiece(PieceId),

    #[error("no geometry for {0}")]
    UnknownPiece(PieceKey),
}

pub type TrackResult<T> = Result<T, TrackError>;
