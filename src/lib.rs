//! Mortydex backend library.
//!
//! Proxies the public Rick & Morty character API behind a TTL + stale-fallback
//! cache and merges per-user favorite marks into the results. The HTTP surface
//! is a thin axum layer over the application services.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
