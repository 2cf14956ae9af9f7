//! Payoff cache: sweep, full clear, index load, and queries
//!
//! `PayoffCache` owns the store handle and carries the consumer-facing API.
//! A sweep solves every configured triple and writes all convergent results
//! in one transaction; the full clear removes every point one cursor step at
//! a time under one transaction; queries read persisted rows directly.

use std::path::Path;
use std::vec;

use thiserror::Error;

use paydown_core::{
    ConfigError, PayoffIndex, PayoffPoint, SweepConfig, SweepProgress, SweepSummary, solve_sweep,
};

use crate::store::{PayoffStore, StoreTx};

/// Errors from cache operations.
///
/// `NoMatchingPoint` is the user-facing lookup miss and carries the queried
/// triple; `Store` wraps any storage engine fault; the other variants reject
/// work before a row is touched.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid sweep configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no payoff point found with balance={balance}, rate={rate}, payment={payment}")]
    NoMatchingPoint {
        balance: f64,
        rate: f64,
        payment: f64,
    },

    #[error("store already holds {points} payoff points; run a full clear before sweeping again")]
    DatasetExists { points: u64 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("storage failure: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Database-backed payoff dataset with the sweep/clear/load/query surface.
#[derive(Debug)]
pub struct PayoffCache {
    store: PayoffStore,
}

impl PayoffCache {
    #[must_use]
    pub fn new(store: PayoffStore) -> Self {
        Self { store }
    }

    /// Open a cache over the SQLite file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        Ok(Self::new(PayoffStore::open(path)?))
    }

    /// Open a cache over a private in-memory store.
    pub fn in_memory() -> Result<Self, CacheError> {
        Ok(Self::new(PayoffStore::in_memory()?))
    }

    /// Sweep the configured ranges and persist every convergent triple.
    ///
    /// Ids are assigned in iteration order starting at 0 and advance for
    /// every visited triple, so stored ids show gaps where triples did not
    /// converge. The whole sweep commits as one transaction; any failure or
    /// cancellation rolls back to the pre-sweep contents. A store that
    /// already holds points is rejected before any triple is solved.
    pub fn calculate_payoff_times(
        &mut self,
        config: &SweepConfig,
        progress: Option<&SweepProgress>,
    ) -> Result<SweepSummary, CacheError> {
        config.validate()?;
        let existing = self.store.count()?;
        if existing > 0 {
            return Err(CacheError::DatasetExists { points: existing });
        }

        let total = config.total_triples();
        if let Some(p) = progress {
            p.reset(total);
        }

        let solved = solve_sweep(config);

        let tx = self.store.transaction()?;
        let mut points_stored = 0;
        for (triple, time) in solved {
            if let Some(p) = progress
                && p.is_cancelled()
            {
                return Err(CacheError::Cancelled);
            }

            match time {
                Some(payoff_time) => {
                    tracing::debug!(
                        id = triple.id,
                        balance = triple.initial_balance,
                        rate = triple.interest_rate,
                        payment = triple.monthly_payment,
                        time = payoff_time,
                        "storing payoff point"
                    );
                    tx.insert_point(&PayoffPoint {
                        id: triple.id,
                        initial_balance: triple.initial_balance,
                        interest_rate: triple.interest_rate,
                        monthly_payment: triple.monthly_payment,
                        payoff_time,
                    })?;
                    points_stored += 1;
                }
                None => {
                    tracing::debug!(
                        id = triple.id,
                        balance = triple.initial_balance,
                        rate = triple.interest_rate,
                        payment = triple.monthly_payment,
                        "payment never outruns interest, skipping"
                    );
                }
            }

            if let Some(p) = progress {
                p.increment();
            }
        }
        tx.commit()?;

        let summary = SweepSummary {
            triples_visited: total,
            points_stored,
            non_convergent: total - points_stored,
        };
        tracing::info!(
            triples = summary.triples_visited,
            stored = summary.points_stored,
            skipped = summary.non_convergent,
            "sweep committed"
        );
        Ok(summary)
    }

    /// Begin a full clear, returning the cursor that performs it.
    ///
    /// The cursor holds the store's write scope: one point is deleted per
    /// step, the transaction commits when the last point is removed, and
    /// dropping the cursor early rolls everything back.
    pub fn delete_payoff_times(&mut self) -> Result<ClearCursor<'_>, CacheError> {
        let tx = self.store.transaction()?;
        let points = tx.select_all()?;
        let total = points.len();
        tracing::info!(points = total, "starting full clear");

        Ok(ClearCursor {
            tx: Some(tx),
            points: points.into_iter(),
            total,
            removed: 0,
        })
    }

    /// Rebuild the in-memory index from every persisted point.
    ///
    /// Returns an owned index; it is never cached here, so callers must
    /// reload after any sweep or clear.
    pub fn load_payoff_times(&self) -> Result<PayoffIndex, CacheError> {
        let points = self.store.select_all()?;
        let index = PayoffIndex::from_points(points);
        tracing::info!(points = index.len(), "rebuilt payoff index");
        Ok(index)
    }

    /// Payoff time for the exact triple, straight from persistent storage.
    pub fn get_payoff_time(
        &self,
        initial_balance: f64,
        interest_rate: f64,
        monthly_payment: f64,
    ) -> Result<f64, CacheError> {
        self.store
            .select_point(initial_balance, interest_rate, monthly_payment)?
            .map(|point| point.payoff_time)
            .ok_or(CacheError::NoMatchingPoint {
                balance: initial_balance,
                rate: interest_rate,
                payment: monthly_payment,
            })
    }

    /// All (payment, payoff time) pairs for a balance/rate pair, payment
    /// ascending. Empty when nothing matches.
    pub fn get_time_vs_payment_data(
        &self,
        initial_balance: f64,
        interest_rate: f64,
    ) -> Result<Vec<(f64, f64)>, CacheError> {
        let mut pairs: Vec<(f64, f64)> = self
            .store
            .select_all()?
            .into_iter()
            .filter(|point| {
                point.initial_balance == initial_balance && point.interest_rate == interest_rate
            })
            .map(|point| (point.monthly_payment, point.payoff_time))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(pairs)
    }
}

/// One step of an in-progress full clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearProgress {
    pub removed: usize,
    pub total: usize,
    /// Percent complete, monotone non-decreasing, exactly 100 on the final
    /// step.
    pub percent: u8,
}

/// Cooperative full-clear cursor.
///
/// Each `next()` deletes one point and yields the updated progress. The
/// backing transaction commits right before the final progress value is
/// yielded; dropping the cursor before that restores every point.
pub struct ClearCursor<'store> {
    tx: Option<StoreTx<'store>>,
    points: vec::IntoIter<PayoffPoint>,
    total: usize,
    removed: usize,
}

impl Iterator for ClearCursor<'_> {
    type Item = Result<ClearProgress, CacheError>;

    fn next(&mut self) -> Option<Self::Item> {
        let tx = self.tx.as_ref()?;
        let point = self.points.next()?;

        tracing::debug!(
            id = point.id,
            balance = point.initial_balance,
            rate = point.interest_rate,
            payment = point.monthly_payment,
            time = point.payoff_time,
            "removing payoff point"
        );
        if let Err(error) = tx.delete_point(point.id) {
            self.tx = None;
            return Some(Err(error.into()));
        }

        self.removed += 1;
        if self.removed == self.total
            && let Some(tx) = self.tx.take()
            && let Err(error) = tx.commit()
        {
            return Some(Err(error.into()));
        }

        Some(Ok(ClearProgress {
            removed: self.removed,
            total: self.total,
            percent: (100 * self.removed / self.total) as u8,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.tx.is_none() {
            return (0, Some(0));
        }
        let remaining = self.total - self.removed;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use paydown_core::{ParamRange, time_until_zero_balance};

    /// 2 balances x 2 rates x 3 payments = 12 triples, 7 of which converge.
    /// At rate 0.01 the balance-1000 row includes the interest-neutral
    /// boundary (payment 10) and the balance-2000 row never converges.
    fn small_config() -> SweepConfig {
        SweepConfig {
            initial_balance: ParamRange::new(1_000.0, 2_000.0, 1_000.0),
            interest_rate: ParamRange::new(0.0, 0.01, 0.01),
            monthly_payment: ParamRange::new(5.0, 15.0, 5.0),
        }
    }

    fn swept_cache() -> PayoffCache {
        let mut cache = PayoffCache::in_memory().unwrap();
        cache.calculate_payoff_times(&small_config(), None).unwrap();
        cache
    }

    #[test]
    fn test_sweep_stores_only_convergent_triples() {
        let mut cache = PayoffCache::in_memory().unwrap();
        let summary = cache.calculate_payoff_times(&small_config(), None).unwrap();

        assert_eq!(summary.triples_visited, 12);
        assert_eq!(summary.points_stored, 7);
        assert_eq!(summary.non_convergent, 5);

        // Ids keep counting through non-convergent triples (3, 4, 9, 10, 11).
        let ids: Vec<i64> = cache.store.select_all().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 5, 6, 7, 8]);
    }

    #[test]
    fn test_point_query_round_trips_swept_values() {
        let cache = swept_cache();

        assert_eq!(cache.get_payoff_time(1_000.0, 0.0, 5.0).unwrap(), 200.0);

        let expected = time_until_zero_balance(0.01, 1_000.0, 15.0).unwrap();
        assert_eq!(
            cache.get_payoff_time(1_000.0, 0.01, 15.0).unwrap(),
            expected
        );
    }

    #[test]
    fn test_lookup_miss_carries_the_queried_triple() {
        let cache = swept_cache();
        let miss = cache.get_payoff_time(1_234.0, 0.05, 42.0);
        match miss {
            Err(CacheError::NoMatchingPoint {
                balance,
                rate,
                payment,
            }) => {
                assert_eq!((balance, rate, payment), (1_234.0, 0.05, 42.0));
            }
            other => panic!("Expected NoMatchingPoint, got {other:?}"),
        }
    }

    #[test]
    fn test_non_convergent_triple_yields_lookup_miss() {
        let cache = swept_cache();
        // Visited by the sweep (id 4) but interest-neutral, so never stored.
        assert!(matches!(
            cache.get_payoff_time(1_000.0, 0.01, 10.0),
            Err(CacheError::NoMatchingPoint { .. })
        ));
    }

    #[test]
    fn test_slice_is_ordered_by_payment() {
        let cache = swept_cache();
        let pairs = cache.get_time_vs_payment_data(1_000.0, 0.0).unwrap();
        assert_eq!(
            pairs,
            vec![
                (5.0, 200.0),
                (10.0, 100.0),
                (15.0, 1_000.0 / 15.0),
            ]
        );
    }

    #[test]
    fn test_slice_of_absent_pair_is_empty() {
        let cache = swept_cache();
        assert_eq!(cache.get_time_vs_payment_data(5_000.0, 0.0).unwrap(), vec![]);
    }

    #[test]
    fn test_sweep_rejects_populated_store() {
        let mut cache = swept_cache();
        let result = cache.calculate_payoff_times(&small_config(), None);
        assert!(matches!(
            result,
            Err(CacheError::DatasetExists { points: 7 })
        ));
        // The existing dataset is untouched.
        assert_eq!(cache.store.count().unwrap(), 7);
    }

    #[test]
    fn test_populated_store_rejected_before_solving() {
        let mut cache = swept_cache();
        let progress = SweepProgress::new(99);

        let result = cache.calculate_payoff_times(&small_config(), Some(&progress));
        assert!(matches!(result, Err(CacheError::DatasetExists { .. })));

        // Rejection precedes the solve phase, so the handle was never reset.
        assert_eq!(progress.total(), 99);
        assert_eq!(progress.completed(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_before_any_write() {
        let mut cache = PayoffCache::in_memory().unwrap();
        let mut config = small_config();
        config.monthly_payment.step = -5.0;

        assert!(matches!(
            cache.calculate_payoff_times(&config, None),
            Err(CacheError::Config(_))
        ));
        assert_eq!(cache.store.count().unwrap(), 0);
    }

    #[test]
    fn test_nonfinite_toml_range_rejected() {
        // TOML parses `inf` as a float literal, so it reaches validation.
        let config: SweepConfig = toml::from_str(
            r#"
            [initial_balance]
            min = 1000.0
            max = inf
            step = 1000.0

            [interest_rate]
            min = 0.0
            max = 0.01
            step = 0.01

            [monthly_payment]
            min = 5.0
            max = 15.0
            step = 5.0
            "#,
        )
        .unwrap();

        let mut cache = PayoffCache::in_memory().unwrap();
        assert!(matches!(
            cache.calculate_payoff_times(&config, None),
            Err(CacheError::Config(ConfigError::NotFinite { .. }))
        ));
        assert_eq!(cache.store.count().unwrap(), 0);
    }

    #[test]
    fn test_cancelled_sweep_rolls_back() {
        let mut cache = PayoffCache::in_memory().unwrap();
        let progress = SweepProgress::new(0);
        progress.cancel();

        let result = cache.calculate_payoff_times(&small_config(), Some(&progress));
        assert!(matches!(result, Err(CacheError::Cancelled)));
        assert_eq!(cache.store.count().unwrap(), 0);
    }

    #[test]
    fn test_cancel_during_write_rolls_back_partial_rows() {
        // Enough triples that the write loop is still running when the
        // polling side sees progress and flips the flag.
        let config = SweepConfig {
            initial_balance: ParamRange::new(1_000.0, 100_000.0, 1_000.0),
            interest_rate: ParamRange::new(0.0, 0.01, 0.0025),
            monthly_payment: ParamRange::new(50.0, 1_000.0, 50.0),
        };
        let mut cache = PayoffCache::in_memory().unwrap();
        let progress = SweepProgress::new(0);

        let result = thread::scope(|scope| {
            let worker = scope.spawn(|| cache.calculate_payoff_times(&config, Some(&progress)));
            while progress.completed() == 0 && !worker.is_finished() {
                thread::yield_now();
            }
            progress.cancel();
            worker.join().unwrap()
        });

        assert!(matches!(result, Err(CacheError::Cancelled)));
        assert!(progress.completed() > 0, "Cancel should land mid-write");
        assert_eq!(cache.store.count().unwrap(), 0);
    }

    #[test]
    fn test_sweep_progress_counts_every_triple() {
        let mut cache = PayoffCache::in_memory().unwrap();
        let progress = SweepProgress::new(0);
        cache
            .calculate_payoff_times(&small_config(), Some(&progress))
            .unwrap();
        assert_eq!(progress.completed(), 12);
        assert_eq!(progress.total(), 12);
    }

    #[test]
    fn test_clear_progress_is_monotone_and_reaches_100() {
        let mut cache = swept_cache();

        let steps: Vec<ClearProgress> = cache
            .delete_payoff_times()
            .unwrap()
            .map(|step| step.unwrap())
            .collect();

        assert_eq!(steps.len(), 7);
        assert!(
            steps.windows(2).all(|w| w[0].percent <= w[1].percent),
            "Percentages must never decrease: {steps:?}"
        );
        assert_eq!(steps.last().unwrap().percent, 100);
        assert_eq!(steps.last().unwrap().removed, 7);

        // The sequence completing is exactly when the store is empty.
        assert_eq!(cache.store.count().unwrap(), 0);
        assert!(matches!(
            cache.get_payoff_time(1_000.0, 0.0, 5.0),
            Err(CacheError::NoMatchingPoint { .. })
        ));
    }

    #[test]
    fn test_abandoned_clear_rolls_back() {
        let mut cache = swept_cache();

        let mut cursor = cache.delete_payoff_times().unwrap();
        assert!(cursor.next().unwrap().is_ok());
        assert!(cursor.next().unwrap().is_ok());
        drop(cursor);

        assert_eq!(cache.store.count().unwrap(), 7);
    }

    #[test]
    fn test_clearing_empty_store_yields_nothing() {
        let mut cache = PayoffCache::in_memory().unwrap();
        assert_eq!(cache.delete_payoff_times().unwrap().count(), 0);
        assert_eq!(cache.store.count().unwrap(), 0);
    }

    #[test]
    fn test_cursor_without_transaction_is_exhausted() {
        // The state a failed step leaves behind: transaction gone, points
        // still unremoved. No further deletions can happen.
        let mut cursor = ClearCursor {
            tx: None,
            points: Vec::new().into_iter(),
            total: 7,
            removed: 2,
        };
        assert_eq!(cursor.size_hint(), (0, Some(0)));
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_index_load_is_idempotent() {
        let cache = swept_cache();
        let first = cache.load_payoff_times().unwrap();
        let second = cache.load_payoff_times().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
        assert_eq!(first.get(1_000.0, 0.0, 5.0), Some(200.0));
        assert_eq!(first.get(2_000.0, 0.01, 15.0), None);
    }

    #[test]
    fn test_index_reflects_clear() {
        let mut cache = swept_cache();
        cache.delete_payoff_times().unwrap().for_each(drop);

        let index = cache.load_payoff_times().unwrap();
        assert!(index.is_empty());
    }
}
