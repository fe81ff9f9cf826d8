//! Numeric transforms over a single channel.
//!
//! Every function here is pure: it takes the readings it needs and returns a
//! fresh value. "Not enough data" is an empty result (`None` or
//! [`statistics::StatisticsSummary::Undefined`]), never an error.

pub mod analysis;
pub mod smoothing;
pub mod statistics;
pub mod trend;
