//! # marketbot-analytics
//!
//! Statistics and simulation for energy market analysis.
//!
//! - **Statistics**: mean, median, population standard deviation, range,
//!   coefficient of variation and a High/Moderate/Low variability band
//! - **Percentiles**: linear interpolation between closest ranks
//! - **Monte Carlo**: discrete geometric Brownian motion price paths with
//!   95% and 68% confidence intervals, sequential or parallel
//!
//! Everything here is pure computation. Randomness is injected, so a fixed
//! seed reproduces results exactly.
//!
//! ## Example
//!
//! ```
//! use marketbot_analytics::prelude::*;
//!
//! let request = SimulationRequest::new(71.50, 0.25).with_days(30);
//! let result = simulate_seeded(&request, 42).unwrap();
//! let (lower, upper) = result.ci_95();
//! assert!(lower <= upper);
//!
//! let stats = compute_statistics(&[71.5, 70.2, 72.1, 69.8, 71.0]).unwrap();
//! assert_eq!(stats.sample_size, 5);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod simulation;
pub mod statistics;

pub use error::{AnalyticsError, AnalyticsResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{AnalyticsError, AnalyticsResult};
    pub use crate::simulation::{
        daily_volatility, simulate, simulate_par, simulate_seeded, PriceDistribution,
        SimulationRequest, SimulationResult, MAX_DAYS, MAX_PATH_COUNT, MAX_SIMULATION_STEPS,
        TRADING_DAYS_PER_YEAR,
    };
    pub use crate::statistics::{
        compute_statistics, compute_statistics_str, parse_values, percentile, StatisticsResult,
        VolatilityBand,
    };
}
