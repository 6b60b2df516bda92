//! Fixed-size SQLite connection pool.
//!
//! All connections are opened when the pool is built and live until `close()`.
//! A checked-out connection is owned by exactly one [`PooledConn`] guard and
//! goes back to the idle queue when the guard is dropped, whatever happened
//! while it was held.

use crate::errors::{AppError, AppResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use rusqlite::Connection;
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_POOL_SIZE: usize = 5;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Settings applied when the pool is built.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub size: usize,
    /// Default deadline for [`DbPool::acquire`]; `None` blocks forever.
    pub acquire_timeout: Option<Duration>,
    pub busy_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
            acquire_timeout: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl PoolOptions {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Point-in-time view of the pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolStatus {
    pub size: usize,
    pub available: usize,
    pub in_use: usize,
    pub peak_in_use: usize,
    pub closed: bool,
}

struct Slot {
    index: usize,
    conn: Connection,
}

struct PoolState {
    idle: VecDeque<Slot>,
    in_use: usize,
    peak_in_use: usize,
    closed: bool,
}

struct PoolInner {
    path: PathBuf,
    size: usize,
    acquire_timeout: Option<Duration>,
    state: Mutex<PoolState>,
    available: Condvar,
    schema: Mutex<()>,
}

/// Shared handle to the pool. Cloning is cheap; every clone talks to the
/// same set of connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Arc<PoolInner>,
}

impl DbPool {
    /// Open `options.size` connections to `path`.
    ///
    /// If any connection fails to open, the ones already opened are dropped
    /// and the error is returned: there is never a half-built pool.
    pub fn open<P: AsRef<Path>>(path: P, options: PoolOptions) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        if options.size == 0 {
            return Err(AppError::Config("pool size must be at least 1".into()));
        }

        let mut idle = VecDeque::with_capacity(options.size);
        for index in 0..options.size {
            let conn = open_connection(&path, options.busy_timeout)?;
            idle.push_back(Slot { index, conn });
        }

        info!(
            path = %path.display(),
            size = options.size,
            "connection pool ready"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                path,
                size: options.size,
                acquire_timeout: options.acquire_timeout,
                state: Mutex::new(PoolState {
                    idle,
                    in_use: 0,
                    peak_in_use: 0,
                    closed: false,
                }),
                available: Condvar::new(),
                schema: Mutex::new(()),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Check out a connection using the pool's default deadline.
    pub fn acquire(&self) -> AppResult<PooledConn> {
        self.acquire_timeout(self.inner.acquire_timeout)
    }

    /// Check out a connection, waiting at most `timeout` (`None` = forever).
    pub fn acquire_timeout(&self, timeout: Option<Duration>) -> AppResult<PooledConn> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.inner.state.lock();

        loop {
            if state.closed {
                return Err(AppError::PoolClosed);
            }

            if let Some(slot) = state.idle.pop_front() {
                state.in_use += 1;
                state.peak_in_use = state.peak_in_use.max(state.in_use);
                debug!(slot = slot.index, in_use = state.in_use, "connection checked out");
                return Ok(PooledConn {
                    pool: Arc::clone(&self.inner),
                    slot: Some(slot),
                });
            }

            match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => {
                    let timed_out = self
                        .inner
                        .available
                        .wait_until(&mut state, deadline)
                        .timed_out();
                    if timed_out && state.idle.is_empty() && !state.closed {
                        warn!(?timeout, "no database connection became available");
                        return Err(AppError::PoolTimeout(timeout));
                    }
                }
                _ => self.inner.available.wait(&mut state),
            }
        }
    }

    /// Return a connection explicitly.
    ///
    /// Dropping the guard does the same; this variant exists so callers can
    /// detect a guard that belongs to another pool.
    pub fn release(&self, conn: PooledConn) -> AppResult<()> {
        if !Arc::ptr_eq(&self.inner, &conn.pool) {
            // the guard still goes home to its own pool when it drops here
            return Err(AppError::ForeignConnection);
        }
        drop(conn);
        Ok(())
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.inner.state.lock();
        PoolStatus {
            size: self.inner.size,
            available: state.idle.len(),
            in_use: state.in_use,
            peak_in_use: state.peak_in_use,
            closed: state.closed,
        }
    }

    /// Mutex serializing table creation and the one-time seed check.
    pub fn schema_lock(&self) -> MutexGuard<'_, ()> {
        self.inner.schema.lock()
    }

    /// Close every idle connection and refuse further checkouts.
    ///
    /// Connections still checked out are closed when their guard returns.
    /// Returns how many connections were closed right away.
    pub fn close(&self) -> usize {
        let drained: Vec<Slot> = {
            let mut state = self.inner.state.lock();
            state.closed = true;
            state.idle.drain(..).collect()
        };
        self.inner.available.notify_all();

        let closed = drained.len();
        for slot in drained {
            close_slot(slot);
        }

        info!(closed, "connection pool closed");
        closed
    }
}

fn open_connection(path: &Path, busy_timeout: Duration) -> AppResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    // journal_mode answers with the resulting mode, so it needs the checked form
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        debug!(path = %path.display(), mode = %mode, "WAL not available, keeping journal mode");
    }
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

fn close_slot(slot: Slot) {
    let index = slot.index;
    if let Err((_, e)) = slot.conn.close() {
        warn!(slot = index, error = %e, "failed to close connection cleanly");
    }
}

/// Exclusive handle to one pooled connection.
pub struct PooledConn {
    pool: Arc<PoolInner>,
    slot: Option<Slot>,
}

impl PooledConn {
    /// Position of this connection inside the pool (0-based).
    pub fn slot(&self) -> usize {
        self.slot.as_ref().map(|s| s.index).unwrap_or_default()
    }
}

impl Deref for PooledConn {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // slot is only taken in Drop
        &self.slot.as_ref().expect("pooled connection already returned").conn
    }
}

impl DerefMut for PooledConn {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.slot.as_mut().expect("pooled connection already returned").conn
    }
}

impl Drop for PooledConn {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };

        let mut state = self.pool.state.lock();
        state.in_use -= 1;

        if state.closed {
            drop(state);
            close_slot(slot);
            return;
        }

        debug!(slot = slot.index, in_use = state.in_use, "connection returned");
        state.idle.push_back(slot);
        drop(state);
        self.pool.available.notify_one();
    }
}
