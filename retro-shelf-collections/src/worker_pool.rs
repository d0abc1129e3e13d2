//! Parallel population of a batch of collections.
//!
//! Each collection in the batch is populated on a blocking task inside a
//! tokio runtime built for the batch. Tasks get a private clone of their
//! entry plus shared read-only access to a [`PopulateContext`], and hand the
//! populated entry back. The caller blocks until the batch completes:
//! - Worker count bounds how many collections populate at once
//! - Progress is reported on a fixed tick while waiting
//! - Setting the cancel flag aborts tasks that have not started yet
//!
//! # Example
//!
//! ```ignore
//! let ctx = Arc::new(PopulateContext::new(corpus, settings, paths));
//! let done = populate_batch(entries, ctx, 4, cancel, |done, total| {
//!     log::debug!("{done}/{total}");
//! });
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinSet;
use tokio::time::Duration;

use crate::collection::CollectionEntry;
use crate::populate::{PopulateContext, populate_entry};

/// How often the waiting caller gets a progress callback.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Populate `jobs` on up to `workers` threads and return the entries that
/// finished. Entries whose task was cancelled or failed are left out, so
/// the caller keeps its unpopulated originals for them.
///
/// Must not be called from inside an async runtime; in that case (or if
/// the runtime cannot be built) the batch runs sequentially instead.
pub fn populate_batch<F>(
    jobs: Vec<CollectionEntry>,
    ctx: Arc<PopulateContext>,
    workers: usize,
    cancel: Arc<AtomicBool>,
    mut on_progress: F,
) -> Vec<CollectionEntry>
where
    F: FnMut(usize, usize),
{
    if jobs.is_empty() {
        return Vec::new();
    }

    if tokio::runtime::Handle::try_current().is_ok() {
        log::debug!("Already inside a runtime, populating collections sequentially");
        return populate_sequential(jobs, &ctx, &cancel, &mut on_progress);
    }

    let workers = workers.max(1);
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(workers)
        .enable_time()
        .thread_name("collection-populate")
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::warn!("Failed to start population workers, populating sequentially: {}", e);
            return populate_sequential(jobs, &ctx, &cancel, &mut on_progress);
        }
    };

    log::debug!("Populating {} collections on {} workers", jobs.len(), workers);
    runtime.block_on(run_batch(jobs, ctx, cancel, &mut on_progress))
}

async fn run_batch<F>(
    jobs: Vec<CollectionEntry>,
    ctx: Arc<PopulateContext>,
    cancel: Arc<AtomicBool>,
    on_progress: &mut F,
) -> Vec<CollectionEntry>
where
    F: FnMut(usize, usize),
{
    let total = jobs.len();
    let mut set = JoinSet::new();
    for mut entry in jobs {
        let ctx = Arc::clone(&ctx);
        let cancel = Arc::clone(&cancel);
        set.spawn_blocking(move || {
            if cancel.load(Ordering::Relaxed) {
                log::debug!("Skipping population of '{}': cancelled", entry.name());
                return None;
            }
            populate_entry(&mut entry, &ctx);
            Some(entry)
        });
    }

    let mut populated = Vec::with_capacity(total);
    let mut finished = 0;
    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);

    loop {
        tokio::select! {
            joined = set.join_next() => {
                let Some(joined) = joined else { break };
                finished += 1;
                match joined {
                    Ok(Some(entry)) => populated.push(entry),
                    Ok(None) => {}
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => log::warn!("Collection population task failed: {}", e),
                }
            }
            _ = ticker.tick() => {
                on_progress(finished, total);
                if cancel.load(Ordering::Relaxed) {
                    set.abort_all();
                }
            }
        }
    }

    on_progress(finished, total);
    populated
}

fn populate_sequential<F>(
    jobs: Vec<CollectionEntry>,
    ctx: &PopulateContext,
    cancel: &AtomicBool,
    on_progress: &mut F,
) -> Vec<CollectionEntry>
where
    F: FnMut(usize, usize),
{
    let total = jobs.len();
    let mut populated = Vec::with_capacity(total);
    for (i, mut entry) in jobs.into_iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        populate_entry(&mut entry, ctx);
        populated.push(entry);
        on_progress(i + 1, total);
    }
    populated
}

#[cfg(test)]
#[path = "tests/worker_pool_tests.rs"]
mod tests;
