//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**: they are defined entirely by their
//! attribute values, and two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one. Constructors are the place where their invariants are
/// checked, so a value object that exists is always valid.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (a discount of 10% equals any other 10% discount)
/// - **Entity**: has identity (two products with the same id are the same product)
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Percent(f64);
///
/// impl ValueObject for Percent {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
