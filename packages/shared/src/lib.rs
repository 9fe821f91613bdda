//! Utilities shared between the Taikyoku server binary, library and tests.

pub mod logger;
pub mod time;
