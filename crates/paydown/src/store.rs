//! SQLite-backed storage for payoff points
//!
//! The store exposes exactly the contract the cache depends on: insert-one,
//! select-all, select-by-exact-triple, delete-one, count, and an explicit
//! transaction scope with commit/rollback. f64 parameters round-trip exactly
//! through REAL columns, so exact-triple selection is plain SQL equality on
//! the swept values.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Result, Row, Transaction, params};

use paydown_core::PayoffPoint;

/// Handle to the payoff points table.
///
/// Reads run on `&self`. Sweep and clear go through
/// [`PayoffStore::transaction`], which borrows the store mutably for the
/// whole write scope, so no query can interleave with an open write.
#[derive(Debug)]
pub struct PayoffStore {
    conn: Connection,
}

impl PayoffStore {
    /// Open a store at the given path, creating the file and schema if
    /// needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open a private in-memory store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Every stored point, in sweep (id) order.
    pub fn select_all(&self) -> Result<Vec<PayoffPoint>> {
        select_all(&self.conn)
    }

    /// The point matching the triple exactly on all three values.
    pub fn select_point(
        &self,
        initial_balance: f64,
        interest_rate: f64,
        monthly_payment: f64,
    ) -> Result<Option<PayoffPoint>> {
        self.conn
            .query_row(
                "SELECT id, initial_balance, interest_rate, monthly_payment, payoff_time
                 FROM payoff_points
                 WHERE initial_balance = ?1 AND interest_rate = ?2 AND monthly_payment = ?3",
                params![initial_balance, interest_rate, monthly_payment],
                point_from_row,
            )
            .optional()
    }

    /// Number of stored points.
    pub fn count(&self) -> Result<u64> {
        count(&self.conn)
    }

    /// Open the exclusive write scope. Dropping the returned scope without
    /// committing rolls back every change made through it.
    pub fn transaction(&mut self) -> Result<StoreTx<'_>> {
        Ok(StoreTx {
            tx: self.conn.transaction()?,
        })
    }
}

/// Write scope over the payoff points table.
pub struct StoreTx<'conn> {
    tx: Transaction<'conn>,
}

impl StoreTx<'_> {
    pub fn insert_point(&self, point: &PayoffPoint) -> Result<()> {
        self.tx.execute(
            "INSERT INTO payoff_points
                 (id, initial_balance, interest_rate, monthly_payment, payoff_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                point.id,
                point.initial_balance,
                point.interest_rate,
                point.monthly_payment,
                point.payoff_time
            ],
        )?;
        Ok(())
    }

    pub fn select_all(&self) -> Result<Vec<PayoffPoint>> {
        select_all(&self.tx)
    }

    pub fn count(&self) -> Result<u64> {
        count(&self.tx)
    }

    /// Delete one point by id; true when a row was removed.
    pub fn delete_point(&self, id: i64) -> Result<bool> {
        let removed = self
            .tx
            .execute("DELETE FROM payoff_points WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Make the scope's changes durable.
    pub fn commit(self) -> Result<()> {
        self.tx.commit()
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payoff_points (
            id              INTEGER PRIMARY KEY,
            initial_balance REAL NOT NULL,
            interest_rate   REAL NOT NULL,
            monthly_payment REAL NOT NULL,
            payoff_time     REAL NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn select_all(conn: &Connection) -> Result<Vec<PayoffPoint>> {
    let mut stmt = conn.prepare(
        "SELECT id, initial_balance, interest_rate, monthly_payment, payoff_time
         FROM payoff_points
         ORDER BY id",
    )?;
    let points = stmt.query_map([], point_from_row)?;
    points.collect()
}

fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM payoff_points", [], |row| row.get(0))?;
    Ok(count as u64)
}

fn point_from_row(row: &Row<'_>) -> Result<PayoffPoint> {
    Ok(PayoffPoint {
        id: row.get(0)?,
        initial_balance: row.get(1)?,
        interest_rate: row.get(2)?,
        monthly_payment: row.get(3)?,
        payoff_time: row.get(4)?,
    })
}
