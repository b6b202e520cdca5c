//! Data models for the Absensi backend.
//!
//! Field names follow the dashboard's snake_case contract; enum values accept
//! both the English names and the organization's own terms on input.

mod attendance;
mod member;

pub use attendance::*;
pub use member::*;
