//! Core data models for the ladder engine.

mod enums;
mod ids;
mod league;
mod period;
mod snapshot;
mod team;

pub use enums::*;
pub use ids::*;
pub use league::*;
pub use period::*;
pub use snapshot::*;
pub use team::*;
