use crate::db::executor::run_in_transaction;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::schema::{SchemaSet, ensure_audit_table, ensure_tables};
use crate::db::seed::{insert_seed, is_seeded};
use crate::errors::AppResult;
use crate::models::audit::NewAuditEntry;
use serde::Serialize;
use tracing::{debug, info};

pub const SYSTEM_ACTOR: &str = "system";

/// What one initialization pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub sets: Vec<SchemaSet>,
    /// Sets whose seed rows were inserted by this pass.
    pub seeded: Vec<SchemaSet>,
    pub seed_rows: usize,
}

/// Initialize the database for the given application sets.
///
/// Runs under the pool's schema lock on a single pooled connection:
///  1. create tables (one transaction, any failure aborts startup)
///  2. for each set whose sentinel row is missing, insert seed rows
pub fn init_db(pool: &DbPool, sets: &[SchemaSet]) -> AppResult<InitReport> {
    let _schema = pool.schema_lock();
    let mut conn = pool.acquire()?;

    let mut unique: Vec<SchemaSet> = Vec::with_capacity(sets.len());
    for set in sets {
        if !unique.contains(set) {
            unique.push(*set);
        }
    }
    let sets = unique;

    //
    // 1) SCHEMA
    //
    run_in_transaction(&mut conn, |tx| {
        ensure_audit_table(tx)?;
        for set in &sets {
            ensure_tables(tx, *set)?;
            debug!(set = %set, tables = ?set.tables(), "tables ensured");
        }
        Ok(())
    })?;

    //
    // 2) SEED DATA (once per set)
    //
    let (seeded, seed_rows) = run_in_transaction(&mut conn, |tx| {
        let mut rng = rand::thread_rng();
        let mut seeded = Vec::new();
        let mut rows = 0;

        for set in &sets {
            if is_seeded(tx, *set)? {
                debug!(set = %set, "seed data already present");
                continue;
            }

            let n = insert_seed(tx, *set, &mut rng)?;
            audit(
                tx,
                &NewAuditEntry::new(SYSTEM_ACTOR, "seed", set.name())
                    .details(format!("inserted {n} demonstration rows")),
            )?;
            seeded.push(*set);
            rows += n;
        }
        Ok((seeded, rows))
    })?;

    info!(sets = ?sets, seeded = ?seeded, "database initialized");

    Ok(InitReport {
        sets,
        seeded,
        seed_rows,
    })
}
