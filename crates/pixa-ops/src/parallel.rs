//! Row-parallel execution on a Rayon thread pool.
//!
//! An [`Executor`] owns a fixed-size pool. Operations hand it a freshly
//! allocated destination buffer and a per-row function; the buffer is split
//! into contiguous row ranges, one per worker, and every range writes only
//! its own rows. The call blocks until all ranges are done.
//!
//! Output does not depend on the number of workers: each row is computed by
//! the same code from the same read-only inputs.
//!
//! # Example
//!
//! ```rust
//! use pixa_ops::parallel::{Executor, ExecutorConfig};
//!
//! let exec = Executor::new(ExecutorConfig::with_threads(2)).unwrap();
//! let mut rows = vec![0u32; 5 * 3];
//! exec.for_each_row(&mut rows, 3, |y, row| {
//!     row.fill(y as u32);
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(&rows[12..], &[4, 4, 4]);
//! ```

use std::sync::OnceLock;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Worker pool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutorConfig {
    /// Number of worker threads; `0` means one per available processing unit.
    pub threads: usize,
    /// Prefix for worker thread names (`"{prefix}-{index}"`).
    pub thread_name_prefix: Option<String>,
}

impl ExecutorConfig {
    /// Config with an explicit worker count.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }
}

/// Fixed-size worker pool used by all operations.
pub struct Executor {
    pool: ThreadPool,
}

static GLOBAL: OnceLock<Executor> = OnceLock::new();

impl Executor {
    /// Builds a pool from `config`.
    ///
    /// # Errors
    ///
    /// [`OpsError::ThreadPool`] if the threads cannot be spawned.
    pub fn new(config: ExecutorConfig) -> OpsResult<Self> {
        let mut builder = ThreadPoolBuilder::new().num_threads(config.threads);
        if let Some(prefix) = config.thread_name_prefix {
            builder = builder.thread_name(move |i| format!("{prefix}-{i}"));
        }
        let pool = builder
            .build()
            .map_err(|e| OpsError::ThreadPool(e.to_string()))?;
        debug!(threads = pool.current_num_threads(), "created executor");
        Ok(Self { pool })
    }

    /// Process-wide executor, created with the default config on first use.
    pub fn global() -> OpsResult<&'static Executor> {
        if let Some(exec) = GLOBAL.get() {
            return Ok(exec);
        }
        let exec = Executor::new(ExecutorConfig::default())?;
        // Losing a race here just drops our pool in favor of the winner's.
        let _ = GLOBAL.set(exec);
        GLOBAL
            .get()
            .ok_or_else(|| OpsError::ThreadPool("global executor unavailable".into()))
    }

    /// Installs a configured process-wide executor.
    ///
    /// Must run before the first operation that uses [`Executor::global`].
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] if the global executor already exists,
    /// [`OpsError::ThreadPool`] if the pool cannot be built.
    pub fn init_global(config: ExecutorConfig) -> OpsResult<()> {
        if GLOBAL.get().is_some() {
            return Err(OpsError::InvalidParameter(
                "global executor already initialized".into(),
            ));
        }
        GLOBAL.set(Executor::new(config)?).map_err(|_| {
            OpsError::InvalidParameter("global executor already initialized".into())
        })
    }

    /// Number of worker threads.
    #[inline]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `f(y, row)` for every `row_len`-sized row of `dst`.
    ///
    /// Rows are grouped into `ceil(rows / threads)`-row ranges that run
    /// concurrently. The first error recorded stops the remaining rows from
    /// being started and is returned once every range has finished.
    pub fn for_each_row<T, F>(&self, dst: &mut [T], row_len: usize, f: F) -> OpsResult<()>
    where
        T: Send,
        F: Fn(usize, &mut [T]) -> OpsResult<()> + Sync,
    {
        if row_len == 0 || dst.is_empty() {
            return Ok(());
        }
        debug_assert_eq!(dst.len() % row_len, 0, "buffer is not a whole number of rows");

        let rows = dst.len() / row_len;
        let units = self.threads().max(1);
        let rows_per_range = rows.div_ceil(units);
        trace!(rows, units, rows_per_range, "row partition");

        let first_error: OnceLock<OpsError> = OnceLock::new();
        self.pool.install(|| {
            dst.par_chunks_mut(rows_per_range * row_len)
                .enumerate()
                .for_each(|(range, chunk)| {
                    let first_row = range * rows_per_range;
                    for (offset, row) in chunk.chunks_mut(row_len).enumerate() {
                        if first_error.get().is_some() {
                            return;
                        }
                        if let Err(e) = f(first_row + offset, row) {
                            let _ = first_error.set(e);
                            return;
                        }
                    }
                });
        });

        match first_error.into_inner() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("threads", &self.threads())
            .finish()
    }
}
