//! Application services layer.

pub mod characters;
pub mod error;
pub mod gateway;
pub mod repos;
