//! HTTP request handlers for the Explore API.

pub mod health;
pub mod monthly;
