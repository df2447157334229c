//! In-memory mirror of the server's calendar data.
//!
//! `EventStore` holds the events of the last loaded date range, the event
//! currently being viewed, resource types and templates. Each method maps to
//! one REST call and patches the cached collections with the result.

pub mod event_store;

pub use event_store::EventStore;
