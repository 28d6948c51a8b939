//! Explore API Service Library
//!
//! HTTP adapter that turns a point and a month range into a
//! quality-filtered monthly NDVI/LST series extracted by NASA AppEEARS.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod request;
pub mod server;
pub mod state;

pub use server::create_router;
pub use state::AppState;
