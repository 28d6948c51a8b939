//! Shared test utilities for the EarthPulse workspace.
//!
//! This crate provides common testing infrastructure including:
//! - An in-memory AppEEARS fake implementing `AppeearsApi`
//! - Catalog, quality legend and bundle fixtures
//! - A CSV builder for extraction results
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, FakeAppeears};
//! ```

pub mod fake;
pub mod fixtures;

pub use fake::{FakeAppeears, LoginBehavior};
pub use fixtures::CsvBuilder;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.6000001_f64, 0.6_f64, 0.001_f64); // passes
/// assert_approx_eq!(0.7_f64, 0.6_f64, 0.001_f64);       // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
