//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// the same value. They are immutable; "changing" one means building a new one.
///
/// - `Money` (amount in cents) is a value object.
/// - `Customer` (sequential id, mutable contact fields) is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
