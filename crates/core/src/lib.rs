//! `malvader-core`: domain building blocks shared by the banking crates.
//!
//! This crate contains **pure domain** primitives (no I/O, no terminal concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use money::Money;
pub use value_object::ValueObject;
