//! In-memory lookup over persisted payoff points
//!
//! The index maps initial balance -> interest rate -> monthly payment ->
//! payoff time. It is always built from scratch from every persisted point,
//! so with unchanged storage a rebuild yields identical contents. Keys are
//! the exact values the sweep generated; no tolerance matching.

use rustc_hash::FxHashMap;

use crate::point::PayoffPoint;

/// Map key carrying the exact bit pattern of a swept parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamKey(u64);

impl ParamKey {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value.to_bits())
    }

    #[must_use]
    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl From<f64> for ParamKey {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

type RateMap = FxHashMap<ParamKey, FxHashMap<ParamKey, f64>>;

/// Three-level lookup: initial balance -> interest rate -> monthly payment ->
/// payoff time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoffIndex {
    by_balance: FxHashMap<ParamKey, RateMap>,
    len: usize,
}

impl PayoffIndex {
    /// Build the index from every persisted point, discarding nothing.
    #[must_use]
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = PayoffPoint>,
    {
        let mut index = Self::default();
        for point in points {
            index.insert(&point);
        }
        index
    }

    fn insert(&mut self, point: &PayoffPoint) {
        let previous = self
            .by_balance
            .entry(ParamKey::new(point.initial_balance))
            .or_default()
            .entry(ParamKey::new(point.interest_rate))
            .or_default()
            .insert(ParamKey::new(point.monthly_payment), point.payoff_time);
        if previous.is_none() {
            self.len += 1;
        }
    }

    /// Exact-triple lookup.
    #[must_use]
    pub fn get(
        &self,
        initial_balance: f64,
        interest_rate: f64,
        monthly_payment: f64,
    ) -> Option<f64> {
        self.by_balance
            .get(&ParamKey::new(initial_balance))?
            .get(&ParamKey::new(interest_rate))?
            .get(&ParamKey::new(monthly_payment))
            .copied()
    }

    /// All (payment, payoff time) pairs for one balance/rate pair, in
    /// ascending payment order. Empty when the pair has no points.
    #[must_use]
    pub fn slice(&self, initial_balance: f64, interest_rate: f64) -> Vec<(f64, f64)> {
        let Some(by_payment) = self
            .by_balance
            .get(&ParamKey::new(initial_balance))
            .and_then(|rates| rates.get(&ParamKey::new(interest_rate)))
        else {
            return Vec::new();
        };

        let mut pairs: Vec<(f64, f64)> = by_payment
            .iter()
            .map(|(payment, time)| (payment.value(), *time))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs
    }

    /// Distinct balance values present, ascending.
    #[must_use]
    pub fn balances(&self) -> Vec<f64> {
        let mut balances: Vec<f64> = self.by_balance.keys().map(|key| key.value()).collect();
        balances.sort_by(f64::total_cmp);
        balances
    }

    /// Number of points in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
