pub mod executor;
pub mod initialize;
pub mod log;
pub mod pool;
pub mod schema;
pub mod seed;
pub mod stats;

use crate::errors::AppResult;
use executor::QueryExecutor;
use initialize::{InitReport, init_db};
use pool::{DbPool, PoolOptions};
use schema::SchemaSet;
use std::path::Path;

/// Build the pool, ensure the schema, and only then hand out the executor.
pub fn open_database<P: AsRef<Path>>(
    path: P,
    options: PoolOptions,
    sets: &[SchemaSet],
) -> AppResult<(QueryExecutor, InitReport)> {
    let pool = DbPool::open(path, options)?;
    let report = match init_db(&pool, sets) {
        Ok(r) => r,
        Err(e) => {
            pool.close();
            return Err(e);
        }
    };
    Ok((QueryExecutor::new(pool), report))
}
