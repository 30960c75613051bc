//! Numeric, ordering, and serialization utilities.

pub mod json;
pub mod math;
