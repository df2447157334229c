//! Data models for the shiftboard API.
//!
//! - `Event`, `EventResource`, `Shift`, `User`: calendar events and the
//!   shift assignments nested inside them
//! - `ResourceType`: server-defined kinds of resources
//! - `Template`: reusable event blueprints
//!
//! Fields the client does not interpret are kept in a flattened `extra` map
//! so objects can be sent back to the server unchanged.

pub mod event;
pub mod resource_type;
pub mod template;

pub use event::{Event, EventResource, NewShift, Shift, User};
pub use resource_type::ResourceType;
pub use template::{NewEventFromTemplate, NewTemplateFromEvent, Template};
