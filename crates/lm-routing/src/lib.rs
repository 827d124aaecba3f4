//! `lm-routing` — the routing ring store.
//!
//! Each logical train owns one ring of [`RING_SLOTS`] slots holding the
//! pieces reserved ahead of it.  Components follow the ring through
//! forward-only [`RoutingHandle`]s; the lead reads ahead through a
//! [`RingView`] and stamps lane bits back into it, where other vehicles'
//! queries see them within the same tick.
//!
//! | Module     | Contents                                         |
//! |------------|--------------------------------------------------|
//! | [`cell`]   | `RoutingCell`, `RoutingSlot`, 16-bit packing     |
//! | [`handle`] | `RoutingHandle`, `RING_SLOTS`                    |
//! | [`store`]  | `RoutingStore`, `RingView`, `Walk`               |
//! | [`error`]  | `RoutingError`, `RoutingResult<T>`               |

pub mod cell;
pub mod error;
pub mod handle;
pub mod store;

#[cfg(test)]
mod tests;

pub use cell::{RoutingCell, RoutingSlot};
pub use error::{RoutingError, RoutingResult};
pub use handle::{RING_SLOTS, RoutingHandle};
pub use store::{RingView, RoutingStore, Walk};
