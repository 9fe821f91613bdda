//! Two-player chess match server library.
//!
//! Pairs WebSocket participants into chess sessions, relays moves, enforces
//! turn ownership and runs per-side countdown clocks until the game ends.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
