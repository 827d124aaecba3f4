//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{ComponentId, TrainId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("train {0} not found")]
    TrainNotFound(TrainId),

    #[error("component {0} not found")]
    ComponentNotFound(ComponentId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `lm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
