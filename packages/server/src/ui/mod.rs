//! Match server UI layer (axum routes, handlers and server runner).

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
