//! Core service layer: models, configuration, external clients and orchestration

pub mod catalog;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod rate_limit;
pub mod services;
