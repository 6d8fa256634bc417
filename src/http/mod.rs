//! HTTP subsystem: server, pipeline wiring and content handlers.

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
