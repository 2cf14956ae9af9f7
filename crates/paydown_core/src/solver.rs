//! Closed-form amortization solver
//!
//! Models a balance accruing compound interest once per period with a fixed
//! payment applied at the end of each period:
//!
//! `B_{n+1} = B_n * (1 + rate) - payment`
//!
//! Solving the recurrence for the continuous time at which the extrapolated
//! balance crosses zero gives
//!
//! `t = -ln(1 - B0 * rate / payment) / ln(1 + rate)`
//!
//! valid whenever the payment exceeds the interest accrued in the first
//! period. With `rate = 0` the balance decays linearly and `t = B0 / payment`.

/// Periods until the balance reaches zero, or `None` when it never does.
///
/// `None` is the expected outcome for any triple where
/// `payment <= initial_balance * rate`: interest accrues at least as fast as
/// the payment retires it, so the balance cannot fall. The interest-neutral
/// boundary (`payment == initial_balance * rate` exactly) is treated the same
/// way. Callers should expect `rate >= 0`, `initial_balance > 0` and
/// `payment > 0`.
///
/// The returned time is fractional and never rounded to whole periods.
#[must_use]
pub fn time_until_zero_balance(rate: f64, initial_balance: f64, payment: f64) -> Option<f64> {
    if payment <= initial_balance * rate {
        return None;
    }
    if rate == 0.0 {
        return Some(initial_balance / payment);
    }
    let time = -(1.0 - initial_balance * rate / payment).ln() / (1.0 + rate).ln();
    Some(time)
}
