//! Domain layer for the realtime subsystem.
//!
//! Identity value objects used by the presence registry, room membership and
//! the event router. Kept independent of transport and serialization
//! concerns.

pub mod error;
pub mod value_object;

pub use error::ValueObjectError;
pub use value_object::{ChatId, ConnectionId, RoomKey, UserId};
