//! Domain layer types and invariants.

pub mod characters;
pub mod favorites;
