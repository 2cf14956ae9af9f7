//! Persisted payoff point row type

use serde::{Deserialize, Serialize};

/// One solved triple as persisted by a sweep.
///
/// `id` is assigned in sweep iteration order and counts every triple visited,
/// so stored ids show gaps where non-convergent triples fell. It is unique
/// within one sweep but carries no meaning across sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub id: i64,
    pub initial_balance: f64,
    pub interest_rate: f64,
    pub monthly_payment: f64,
    /// Periods until the balance reaches zero; fractional, never rounded.
    pub payoff_time: f64,
}
