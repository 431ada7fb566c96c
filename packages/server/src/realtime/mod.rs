//! Realtime core: presence, rooms, typing state and the event router.
//!
//! Everything in this module is synchronous, in-memory state with no I/O.
//! The router consumes inbound events and returns the deliveries they imply;
//! the `ui` layer owns the sockets and performs the actual sends. That split
//! keeps every fan-out rule unit-testable without a transport.

pub mod presence;
pub mod rooms;
pub mod router;
pub mod typing;

pub use presence::PresenceRegistry;
pub use rooms::RoomMembership;
pub use router::{Delivery, EventRouter};
pub use typing::TypingTracker;
