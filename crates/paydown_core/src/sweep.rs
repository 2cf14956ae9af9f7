//! Exhaustive sweep plan over the three parameter ranges
//!
//! A sweep visits every (initial balance, interest rate, monthly payment)
//! triple in nested ascending order: balance outer, rate middle, payment
//! inner. Ids are assigned sequentially from 0 to every triple visited,
//! whether or not it converges, so persisted ids reproduce iteration order.
//!
//! The solve phase is pure and runs in parallel under the `parallel` feature;
//! writing results to storage is the application's job and stays serial.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::SweepConfig;
use crate::solver::time_until_zero_balance;

/// One visited parameter combination, tagged with its sweep id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepTriple {
    pub id: i64,
    pub initial_balance: f64,
    pub interest_rate: f64,
    pub monthly_payment: f64,
}

/// Iterator over every triple of a sweep, in iteration order.
///
/// Axis values are expanded once at construction so the same config always
/// yields bit-identical triples.
#[derive(Debug, Clone)]
pub struct Triples {
    balances: Vec<f64>,
    rates: Vec<f64>,
    payments: Vec<f64>,
    balance_idx: usize,
    rate_idx: usize,
    payment_idx: usize,
    next_id: i64,
}

impl Triples {
    #[must_use]
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            balances: config.initial_balance.values(),
            rates: config.interest_rate.values(),
            payments: config.monthly_payment.values(),
            balance_idx: 0,
            rate_idx: 0,
            payment_idx: 0,
            next_id: 0,
        }
    }
}

impl Iterator for Triples {
    type Item = SweepTriple;

    fn next(&mut self) -> Option<Self::Item> {
        if self.balance_idx >= self.balances.len()
            || self.rates.is_empty()
            || self.payments.is_empty()
        {
            return None;
        }

        let triple = SweepTriple {
            id: self.next_id,
            initial_balance: self.balances[self.balance_idx],
            interest_rate: self.rates[self.rate_idx],
            monthly_payment: self.payments[self.payment_idx],
        };

        self.next_id += 1;
        self.payment_idx += 1;
        if self.payment_idx == self.payments.len() {
            self.payment_idx = 0;
            self.rate_idx += 1;
            if self.rate_idx == self.rates.len() {
                self.rate_idx = 0;
                self.balance_idx += 1;
            }
        }

        Some(triple)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.balances.len() * self.rates.len() * self.payments.len();
        let remaining = total.saturating_sub(self.next_id as usize);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Triples {}

/// Solve every triple of the sweep, preserving iteration order.
///
/// Returns one entry per visited triple; `None` marks the non-convergent
/// ones. With the `parallel` feature the solves are distributed across a
/// rayon pool, which does not affect ordering or id assignment.
#[must_use]
pub fn solve_sweep(config: &SweepConfig) -> Vec<(SweepTriple, Option<f64>)> {
    let solve = |triple: SweepTriple| {
        let time = time_until_zero_balance(
            triple.interest_rate,
            triple.initial_balance,
            triple.monthly_payment,
        );
        (triple, time)
    };

    // Solve every planned triple, order preserved
    #[cfg(feature = "parallel")]
    let results: Vec<(SweepTriple, Option<f64>)> = Triples::new(config)
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(solve)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(SweepTriple, Option<f64>)> = Triples::new(config).map(solve).collect();

    results
}

/// Outcome counts from one completed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    /// Every triple the sweep iterated, convergent or not.
    pub triples_visited: usize,
    /// Rows written to storage.
    pub points_stored: usize,
    /// Triples skipped because the payment never outruns interest.
    pub non_convergent: usize,
}

/// Shared progress handle for a running sweep.
///
/// Clones share the same counters, so the thread driving the sweep can
/// increment while another thread polls for display. Cancellation is
/// cooperative: the write loop checks the flag once per triple and rolls
/// back when it is set.
#[derive(Debug, Clone)]
pub struct SweepProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SweepProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Triples handled so far, convergent or not.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Start a fresh count against a new total.
    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Ask the sweep to stop at its next cancellation point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
