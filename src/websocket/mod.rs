//! Admission surface: HTTP handlers and router wiring that sit in front of
//! the room registry, the Hub, and per-connection tasks.

pub mod handler;
pub mod routes;

pub use routes::create_router;
