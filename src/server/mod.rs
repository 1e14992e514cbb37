//! HTTP surface: routes, request bodies and error responses

pub mod api;
pub mod error;
pub mod types;

pub use api::{router, run_server, AppState};
