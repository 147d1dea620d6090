//! Bounded rayon worker pools.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Default worker count: the available parallelism, or 4 if unknown.
pub(crate) fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Build a pool with at most `max_workers` threads (at least one).
pub(crate) fn build_pool(max_workers: usize) -> Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .thread_name(|i| format!("pinfold-worker-{i}"))
        .build()
}
