//! Bounded, cancel-on-first-failure download of the asset plan.
//!
//! At most `max_concurrent` worker threads pull planned assets from a shared
//! queue. Each result lands in the slot of its plan index, so the returned
//! list is in plan order no matter which transfer finishes first. The first
//! failure raises a shared flag: workers stop taking new work and in-flight
//! transfers abort from curl's progress callback.

use crate::error::{LoadError, Result};
use crate::fetch::{FetchedResource, Fetcher};
use crate::rewrite::{DownloadPlan, PlannedAsset};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// A planned asset together with its fetched bytes.
#[derive(Debug, Clone)]
pub struct DownloadedAsset {
    pub planned: PlannedAsset,
    pub resource: FetchedResource,
}

/// Keeps the first real failure; a cancellation only counts if nothing else was seen.
fn record_failure(first: &mut Option<LoadError>, err: LoadError) {
    match first {
        None => *first = Some(err),
        Some(existing) if existing.is_cancelled() && !err.is_cancelled() => *first = Some(err),
        Some(_) => {}
    }
}

/// Downloads every planned asset with up to `max_concurrent` requests in flight.
/// `0` is treated as `1`. Returns the assets in plan order, or the first failure.
pub fn download_all(
    fetcher: &Fetcher,
    plan: &DownloadPlan,
    max_concurrent: usize,
) -> Result<Vec<DownloadedAsset>> {
    if plan.is_empty() {
        return Ok(Vec::new());
    }

    let count = plan.len();
    let cancel = Arc::new(AtomicBool::new(false));
    let fetcher = fetcher.with_cancel_flag(Arc::clone(&cancel));
    let work: Arc<Mutex<VecDeque<(usize, PlannedAsset)>>> =
        Arc::new(Mutex::new(plan.iter().cloned().enumerate().collect()));
    let (tx, rx) = mpsc::channel::<(usize, Result<FetchedResource>)>();
    let num_workers = max_concurrent.max(1).min(count);
    tracing::debug!(assets = count, workers = num_workers, "starting asset downloads");

    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let fetcher = fetcher.clone();
        let cancel = Arc::clone(&cancel);
        handles.push(std::thread::spawn(move || loop {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let next = work.lock().ok().and_then(|mut q| q.pop_front());
            let Some((index, asset)) = next else {
                break;
            };
            let res = fetcher.fetch(&asset.source_url);
            if res.is_err() {
                cancel.store(true, Ordering::Relaxed);
            }
            if tx.send((index, res)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut slots: Vec<Option<FetchedResource>> = vec![None; count];
    let mut first_error: Option<LoadError> = None;
    let mut done = 0usize;
    for (index, res) in rx {
        match res {
            Ok(resource) => {
                done += 1;
                tracing::info!(
                    url = %resource.url,
                    "downloaded asset {}/{}",
                    done,
                    count
                );
                slots[index] = Some(resource);
            }
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!("asset download failed: {}", e);
                }
                record_failure(&mut first_error, e);
            }
        }
    }
    for h in handles {
        if let Err(panic) = h.join() {
            std::panic::resume_unwind(panic);
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    plan.iter()
        .zip(slots)
        .map(|(planned, slot)| match slot {
            Some(resource) => Ok(DownloadedAsset {
                planned: planned.clone(),
                resource,
            }),
            None => Err(LoadError::Cancelled {
                url: planned.source_url.to_string(),
            }),
        })
        .collect()
}
