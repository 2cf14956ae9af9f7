//! Payoff cache application library
//!
//! Persists solved payoff times in SQLite and exposes the consumer-facing
//! cache API used by the `paydown` binary (and any report layer built on top
//! of it):
//! - `PayoffStore` - the six-operation storage contract over rusqlite
//! - `PayoffCache` - sweep, full clear, index load, and point/slice queries
//! - `ClearCursor` - cooperative, progress-reporting full clear

// ============================================================================
// Core modules
// ============================================================================

pub mod cache;
pub mod logging;
pub mod store;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cache::{CacheError, ClearCursor, ClearProgress, PayoffCache};
pub use logging::init_logging;
pub use store::PayoffStore;
