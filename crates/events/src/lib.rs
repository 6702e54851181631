//! Domain events emitted by the banking aggregates.

pub mod event;

pub use event::Event;
