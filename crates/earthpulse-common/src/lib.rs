//! Common types shared by the EarthPulse explore crates.

pub mod error;
pub mod ids;
pub mod month;
pub mod series;

pub use error::{ExploreError, ExploreResult};
pub use ids::{IdParseError, Metric, Provider};
pub use month::{Month, MonthParseError, MonthRange};
pub use series::{ErrorBody, MonthlyResponse, SeriesPoint};
