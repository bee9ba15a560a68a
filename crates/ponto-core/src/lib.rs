//! Core domain logic for the ponto time clock.
//!
//! This crate contains:
//! - Time accounting: elapsed time and `"1 hour, 5 minutes"` formatting
//! - Sessions and the in-memory registry that owns them
//! - The lifecycle state machine ([`Timeclock`]) and the seams it calls into:
//!   [`RecordSink`] for durable records, [`Presenter`] for status cards and
//!   [`NameResolver`] for display names

pub mod card;
pub mod duration;
pub mod names;
pub mod record;
pub mod registry;
pub mod session;
mod timeclock;

pub use card::{Button, Card, CardBody, Control, Presenter};
pub use duration::{elapsed, format_duration};
pub use names::{DisplayNames, NameResolver};
pub use record::{FinishedRecord, RecordSink, SinkError};
pub use registry::SessionRegistry;
pub use session::{ChannelRef, MessageRef, Session, SessionStatus, UserId};
pub use timeclock::{Action, Rejection, Timeclock, TimeclockError, Transition};
