//! Sweep range configuration
//!
//! A sweep is driven by three discrete ranges, one per parameter axis. Ranges
//! are deserialized from the application's TOML config or built from
//! `SweepConfig::default()`, and must pass `validate()` before any work
//! begins.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identifies one of the three swept parameter axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    InitialBalance,
    InterestRate,
    MonthlyPayment,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::InitialBalance => "initial balance",
            Axis::InterestRate => "interest rate",
            Axis::MonthlyPayment => "monthly payment",
        };
        f.write_str(name)
    }
}

/// One discrete axis: every value from `min` through `max` in `step`
/// increments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    #[must_use]
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Number of values in the range, inclusive of `max` when it lands on the
    /// step grid. The quotient carries a small tolerance so decimal steps
    /// expand to the expected count.
    #[must_use]
    pub fn steps(&self) -> usize {
        ((self.max - self.min) / self.step + 1.0 + 1e-9).floor() as usize
    }

    /// All values in ascending order. Each value is generated as
    /// `min + i * step` so repeated expansions are bit-identical, which keeps
    /// persisted keys and later queries in exact agreement.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        (0..self.steps())
            .map(|i| self.min + i as f64 * self.step)
            .collect()
    }
}

/// The three configured ranges driving a sweep.
///
/// Iteration order is fixed: initial balance (outer), interest rate (middle),
/// monthly payment (inner), each ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub initial_balance: ParamRange,
    pub interest_rate: ParamRange,
    pub monthly_payment: ParamRange,
}

impl SweepConfig {
    /// Reject malformed ranges before any row is written or deleted.
    ///
    /// Checks per axis: `min`, `max`, and `step` are finite, `step > 0`, and
    /// `min <= max`. Balance and payment must start above zero; the rate may
    /// start at zero but not below. TOML accepts `inf` and `nan` float
    /// literals, so finiteness is checked explicitly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, range) in self.axes() {
            if !range.min.is_finite() || !range.max.is_finite() || !range.step.is_finite() {
                return Err(ConfigError::NotFinite {
                    axis,
                    min: range.min,
                    max: range.max,
                    step: range.step,
                });
            }
            if !(range.step > 0.0) {
                return Err(ConfigError::StepNotPositive {
                    axis,
                    step: range.step,
                });
            }
            if !(range.min <= range.max) {
                return Err(ConfigError::MinExceedsMax {
                    axis,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if self.initial_balance.min <= 0.0 {
            return Err(ConfigError::MinNotPositive {
                axis: Axis::InitialBalance,
                min: self.initial_balance.min,
            });
        }
        if self.monthly_payment.min <= 0.0 {
            return Err(ConfigError::MinNotPositive {
                axis: Axis::MonthlyPayment,
                min: self.monthly_payment.min,
            });
        }
        if self.interest_rate.min < 0.0 {
            return Err(ConfigError::NegativeRate {
                min: self.interest_rate.min,
            });
        }
        Ok(())
    }

    /// Total number of triples one sweep visits (convergent or not).
    #[must_use]
    pub fn total_triples(&self) -> usize {
        self.initial_balance.steps() * self.interest_rate.steps() * self.monthly_payment.steps()
    }

    fn axes(&self) -> [(Axis, ParamRange); 3] {
        [
            (Axis::InitialBalance, self.initial_balance),
            (Axis::InterestRate, self.interest_rate),
            (Axis::MonthlyPayment, self.monthly_payment),
        ]
    }
}

impl Default for SweepConfig {
    /// A realistic consumer-loan grid: balances 10k-100k, monthly rates
    /// 0.25%-2%, payments 200-2000.
    fn default() -> Self {
        Self {
            initial_balance: ParamRange::new(10_000.0, 100_000.0, 10_000.0),
            interest_rate: ParamRange::new(0.0025, 0.02, 0.0025),
            monthly_payment: ParamRange::new(200.0, 2_000.0, 100.0),
        }
    }
}
