//! Integration tests for the payoff engine
//!
//! Tests are organized by topic:
//! - `solver` - Closed-form solver properties across parameter grids
//! - `sweep` - Sweep iteration order, id assignment, and the solve phase
