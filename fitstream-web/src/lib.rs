//! Fitstream Web - JSON API and media streaming server
//!
//! Serves workout videos with HTTP range support plus the JSON endpoints
//! the coaching frontend consumes: library listing, view logging, and
//! health. Authentication and the relational data model live in the outer
//! platform; this crate trusts the access decision it is handed.

pub mod access;
pub mod handlers;
pub mod server;

pub use access::{AccessPolicy, AllowAll};
pub use server::{AppState, build_router, run_server};
