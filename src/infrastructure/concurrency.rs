//! Concurrency management for Plugin Scout.
//! Configures the rayon pool used for batch introspection.

use anyhow::{Context, Result};

/// Worker count: the configured number, or half the cores (at least one).
pub fn worker_count(configured: Option<usize>) -> usize {
    match configured {
        Some(n) if n > 0 => n,
        _ => std::cmp::max(1, num_cpus::get() / 2),
    }
}

/// Initialize the global rayon thread pool. Returns the worker count.
pub fn init_thread_pool(configured: Option<usize>) -> Result<usize> {
    let workers = worker_count(configured);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .context("Failed to initialize the global thread pool")?;

    tracing::debug!(
        "Initialized thread pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );
    Ok(workers)
}
