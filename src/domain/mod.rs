//! Domain model: wire aggregates, value objects and store events
pub mod aggregates;
pub mod events;
pub mod value_objects;
