//! Descriptive statistics over a numeric sample.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Coefficient of variation (percent) above which variability is "High".
pub const HIGH_VARIABILITY_CV: f64 = 10.0;

/// Coefficient of variation (percent) above which variability is "Moderate".
pub const MODERATE_VARIABILITY_CV: f64 = 5.0;

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`).
pub fn population_std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sorts a copy of `values` ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Percentile of an ascending-sorted sample using linear interpolation
/// between closest ranks.
///
/// `pct` is in `[0, 100]`. The rank of the result is `pct / 100 * (n - 1)`.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    assert!(!sorted.is_empty(), "percentile of empty sample");

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Median of an ascending-sorted sample.
pub fn median(sorted: &[f64]) -> f64 {
    percentile(sorted, 50.0)
}

/// Parses a comma-separated list of numbers.
///
/// Every token must parse as a finite number; the first failure aborts the
/// whole parse. An empty string is a single empty token and fails.
pub fn parse_values(input: &str) -> AnalyticsResult<Vec<f64>> {
    input
        .split(',')
        .map(str::trim)
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(AnalyticsError::InvalidNumber {
                token: token.to_string(),
            }),
        })
        .collect()
}

/// Variability band derived from the coefficient of variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityBand {
    /// CV <= 5%
    Low,
    /// 5% < CV <= 10%
    Moderate,
    /// CV > 10%
    High,
}

impl VolatilityBand {
    /// Classifies a coefficient of variation given in percent.
    pub fn classify(cv_pct: f64) -> Self {
        if cv_pct > HIGH_VARIABILITY_CV {
            VolatilityBand::High
        } else if cv_pct > MODERATE_VARIABILITY_CV {
            VolatilityBand::Moderate
        } else {
            VolatilityBand::Low
        }
    }

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityBand::Low => "Low",
            VolatilityBand::Moderate => "Moderate",
            VolatilityBand::High => "High",
        }
    }
}

impl fmt::Display for VolatilityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics of a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResult {
    /// Number of observations
    pub sample_size: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Smallest observation
    pub min: f64,
    /// Largest observation
    pub max: f64,
    /// `max - min`
    pub range: f64,
}

impl StatisticsResult {
    /// Coefficient of variation in percent (`std_dev / mean * 100`).
    ///
    /// Returns [`AnalyticsError::DivisionByZero`] when the mean is zero and
    /// [`AnalyticsError::Validation`] when the ratio overflows.
    pub fn coefficient_of_variation(&self) -> AnalyticsResult<f64> {
        if self.mean == 0.0 {
            return Err(AnalyticsError::DivisionByZero {
                context: "coefficient of variation (mean is zero)".to_string(),
            });
        }
        let cv = self.std_dev / self.mean * 100.0;
        if !cv.is_finite() {
            return Err(AnalyticsError::Validation(format!(
                "coefficient of variation overflows (std dev {}, mean {})",
                self.std_dev, self.mean
            )));
        }
        Ok(cv)
    }

    /// Variability band of the sample.
    pub fn volatility_band(&self) -> AnalyticsResult<VolatilityBand> {
        self.coefficient_of_variation().map(VolatilityBand::classify)
    }
}

/// Computes summary statistics.
///
/// Fails with [`AnalyticsError::Validation`] if `values` is empty, holds a
/// non-finite number, or is large enough that mean, spread or range
/// overflow `f64`.
pub fn compute_statistics(values: &[f64]) -> AnalyticsResult<StatisticsResult> {
    if values.is_empty() {
        return Err(AnalyticsError::Validation("no values provided".to_string()));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(AnalyticsError::Validation(format!(
            "non-finite value in sample: {bad}"
        )));
    }

    let sorted = sorted(values);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    let stats = StatisticsResult {
        sample_size: values.len(),
        mean: mean(values),
        median: median(&sorted),
        std_dev: population_std_dev(values),
        min,
        max,
        range: max - min,
    };
    if !(stats.mean.is_finite() && stats.std_dev.is_finite() && stats.range.is_finite()) {
        return Err(AnalyticsError::Validation(
            "values too large: mean, standard deviation or range overflows".to_string(),
        ));
    }
    Ok(stats)
}

/// Parses a comma-separated string and computes its statistics.
pub fn compute_statistics_str(input: &str) -> AnalyticsResult<StatisticsResult> {
    compute_statistics(&parse_values(input)?)
}
