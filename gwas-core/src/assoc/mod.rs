//! Per-marker association engines.
//!
//! One result per input marker, always: mathematically undefined
//! markers are flagged, never dropped.

pub mod chisq;
pub mod regression;
pub mod result;
