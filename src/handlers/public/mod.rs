// handlers/public/mod.rs - endpoints reachable without a token:
// service descriptor, health check and token acquisition.

pub mod auth;
pub mod service;

pub use service::{health, root};
