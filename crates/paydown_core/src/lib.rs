//! Loan payoff-time engine
//!
//! This crate computes how long an amortizing balance takes to reach zero and
//! plans exhaustive sweeps over the (initial balance, interest rate, monthly
//! payment) parameter space. It provides:
//! - A closed-form amortization solver (`time_until_zero_balance`)
//! - Discrete parameter ranges with validation (`ParamRange`, `SweepConfig`)
//! - A deterministic sweep plan with sequential ids and an optionally
//!   parallel solve phase (`Triples`, `solve_sweep`)
//! - Shared progress/cancellation handles for long sweeps (`SweepProgress`)
//! - A three-level in-memory lookup over solved points (`PayoffIndex`)
//!
//! Persistence and the consumer-facing cache API live in the `paydown`
//! application crate; everything here is pure and IO-free.

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod config;
pub mod error;
pub mod index;
pub mod point;
pub mod solver;
pub mod sweep;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{Axis, ParamRange, SweepConfig};
pub use error::ConfigError;
pub use index::{ParamKey, PayoffIndex};
pub use point::PayoffPoint;
pub use solver::time_until_zero_balance;
pub use sweep::{SweepProgress, SweepSummary, SweepTriple, solve_sweep};
