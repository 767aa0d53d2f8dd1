//! Monte Carlo price simulation.
//!
//! Paths follow a discrete geometric Brownian motion: each trading day the
//! price is multiplied by `1 + r`, where `r ~ N(drift, sigma_daily)` and
//! `sigma_daily = volatility / sqrt(252)`. This is per-step multiplicative
//! compounding, not the closed-form log-normal solution.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::statistics::{mean, median, percentile, population_std_dev, sorted};

/// Trading days per year used to scale annual volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default simulation horizon in days.
pub const DEFAULT_DAYS: u32 = 30;

/// Default number of simulated paths.
pub const DEFAULT_PATH_COUNT: u32 = 1000;

/// Largest accepted path count.
pub const MAX_PATH_COUNT: u32 = 100_000;

/// Largest accepted horizon, ten years of trading days.
pub const MAX_DAYS: u32 = 2_520;

/// Largest accepted `path_count * days`, bounding the work of one run.
pub const MAX_SIMULATION_STEPS: u64 = 10_000_000;

/// Converts annualized volatility to a per-trading-day value.
pub fn daily_volatility(annual: f64) -> f64 {
    annual / TRADING_DAYS_PER_YEAR.sqrt()
}

/// Inputs to a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Starting price, > 0
    pub current_price: f64,
    /// Annualized volatility as a decimal (0.25 = 25%), >= 0
    pub volatility: f64,
    /// Steps per path, >= 1
    pub days: u32,
    /// Number of independent paths, >= 1
    pub path_count: u32,
    /// Mean daily return as a decimal
    pub drift: f64,
}

impl SimulationRequest {
    /// Creates a request with default horizon, path count and zero drift.
    pub fn new(current_price: f64, volatility: f64) -> Self {
        Self {
            current_price,
            volatility,
            days: DEFAULT_DAYS,
            path_count: DEFAULT_PATH_COUNT,
            drift: 0.0,
        }
    }

    /// Sets the horizon.
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    /// Sets the number of paths.
    pub fn with_path_count(mut self, path_count: u32) -> Self {
        self.path_count = path_count;
        self
    }

    /// Sets the daily drift.
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    /// Checks preconditions, including the [`MAX_DAYS`], [`MAX_PATH_COUNT`]
    /// and [`MAX_SIMULATION_STEPS`] ceilings.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if !(self.current_price.is_finite() && self.current_price > 0.0) {
            return Err(AnalyticsError::Validation(format!(
                "current price must be a positive number, got {}",
                self.current_price
            )));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(AnalyticsError::Validation(format!(
                "volatility must be a non-negative number, got {}",
                self.volatility
            )));
        }
        if !self.drift.is_finite() {
            return Err(AnalyticsError::Validation(format!(
                "drift must be a finite number, got {}",
                self.drift
            )));
        }
        if self.days == 0 {
            return Err(AnalyticsError::Validation(
                "days must be at least 1".to_string(),
            ));
        }
        if self.path_count == 0 {
            return Err(AnalyticsError::Validation(
                "simulation count must be at least 1".to_string(),
            ));
        }
        if self.days > MAX_DAYS {
            return Err(AnalyticsError::Validation(format!(
                "days must be at most {MAX_DAYS}, got {}",
                self.days
            )));
        }
        if self.path_count > MAX_PATH_COUNT {
            return Err(AnalyticsError::Validation(format!(
                "simulation count must be at most {MAX_PATH_COUNT}, got {}",
                self.path_count
            )));
        }
        let steps = u64::from(self.path_count) * u64::from(self.days);
        if steps > MAX_SIMULATION_STEPS {
            return Err(AnalyticsError::Validation(format!(
                "simulations x days must be at most {MAX_SIMULATION_STEPS}, got {steps}"
            )));
        }
        Ok(())
    }
}

/// Distribution of terminal prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDistribution {
    /// Mean terminal price
    pub mean: f64,
    /// Median terminal price
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// 2.5th percentile (lower 95% bound)
    pub p2_5: f64,
    /// 16th percentile (lower 68% bound)
    pub p16: f64,
    /// 84th percentile (upper 68% bound)
    pub p84: f64,
    /// 97.5th percentile (upper 95% bound)
    pub p97_5: f64,
}

impl PriceDistribution {
    /// Summarizes a non-empty sample.
    pub fn from_sample(values: &[f64]) -> AnalyticsResult<Self> {
        if values.is_empty() {
            return Err(AnalyticsError::Validation(
                "no terminal prices to summarize".to_string(),
            ));
        }
        let sorted = sorted(values);
        Ok(Self {
            mean: mean(values),
            median: median(&sorted),
            std_dev: population_std_dev(values),
            p2_5: percentile(&sorted, 2.5),
            p16: percentile(&sorted, 16.0),
            p84: percentile(&sorted, 84.0),
            p97_5: percentile(&sorted, 97.5),
        })
    }
}

/// Output of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// The inputs
    pub request: SimulationRequest,
    /// One terminal price per path, in path order
    pub terminal_prices: Vec<f64>,
    /// Summary of `terminal_prices`
    pub distribution: PriceDistribution,
}

impl SimulationResult {
    /// `(p2.5, p97.5)`
    pub fn ci_95(&self) -> (f64, f64) {
        (self.distribution.p2_5, self.distribution.p97_5)
    }

    /// `(p16, p84)`
    pub fn ci_68(&self) -> (f64, f64) {
        (self.distribution.p16, self.distribution.p84)
    }

    /// Upside to the upper 95% bound, in percent of the starting price.
    pub fn upside_pct(&self) -> f64 {
        let start = self.request.current_price;
        (self.distribution.p97_5 - start) / start * 100.0
    }

    /// Downside to the lower 95% bound, in percent of the starting price.
    pub fn downside_pct(&self) -> f64 {
        let start = self.request.current_price;
        (start - self.distribution.p2_5) / start * 100.0
    }

    /// Mean terminal price relative to the start, in percent.
    pub fn expected_change_pct(&self) -> f64 {
        let start = self.request.current_price;
        (self.distribution.mean - start) / start * 100.0
    }
}

/// Daily return distribution. Zero volatility degenerates to the drift.
enum StepDistribution {
    Constant(f64),
    Normal(Normal),
}

impl StepDistribution {
    fn new(drift: f64, sigma: f64) -> AnalyticsResult<Self> {
        if sigma == 0.0 {
            return Ok(StepDistribution::Constant(drift));
        }
        Normal::new(drift, sigma)
            .map(StepDistribution::Normal)
            .map_err(|e| AnalyticsError::Validation(format!("return distribution: {e}")))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            StepDistribution::Constant(drift) => *drift,
            StepDistribution::Normal(normal) => normal.sample(rng),
        }
    }
}

fn simulate_path<R: Rng + ?Sized>(
    start: f64,
    days: u32,
    step: &StepDistribution,
    rng: &mut R,
) -> f64 {
    let mut price = start;
    for _ in 0..days {
        price *= 1.0 + step.sample(rng);
    }
    price
}

fn finish(request: SimulationRequest, terminal_prices: Vec<f64>) -> AnalyticsResult<SimulationResult> {
    let distribution = PriceDistribution::from_sample(&terminal_prices)?;
    Ok(SimulationResult {
        request,
        terminal_prices,
        distribution,
    })
}

/// Runs the simulation sequentially, drawing from `rng`.
///
/// Paths are generated one after another from the same generator, so a
/// seeded `rng` gives bit-identical results.
pub fn simulate<R: Rng + ?Sized>(
    request: &SimulationRequest,
    rng: &mut R,
) -> AnalyticsResult<SimulationResult> {
    request.validate()?;
    let step = StepDistribution::new(request.drift, daily_volatility(request.volatility))?;

    let terminal_prices = (0..request.path_count)
        .map(|_| simulate_path(request.current_price, request.days, &step, rng))
        .collect();

    finish(*request, terminal_prices)
}

/// Runs the simulation sequentially from a `StdRng` seeded with `seed`.
pub fn simulate_seeded(request: &SimulationRequest, seed: u64) -> AnalyticsResult<SimulationResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate(request, &mut rng)
}

/// Runs paths in parallel.
///
/// Each path draws from its own generator seeded from `(seed, path index)`,
/// so results depend only on `seed`, not on thread count or scheduling.
/// The sequence differs from [`simulate_seeded`] with the same seed.
pub fn simulate_par(request: &SimulationRequest, seed: u64) -> AnalyticsResult<SimulationResult> {
    request.validate()?;
    let step = StepDistribution::new(request.drift, daily_volatility(request.volatility))?;

    let terminal_prices = (0..request.path_count)
        .into_par_iter()
        .map(|path| {
            let mut rng = StdRng::seed_from_u64(path_seed(seed, path));
            simulate_path(request.current_price, request.days, &step, &mut rng)
        })
        .collect();

    finish(*request, terminal_prices)
}

/// SplitMix64 over the seed and path index.
fn path_seed(seed: u64, path: u32) -> u64 {
    let mut z = seed.wrapping_add(u64::from(path).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
