use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use couchctl_core::{Error, Result};

/// Fallback width when the host won't say how parallel it is.
const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound on how long one batch of requests may take as a whole.
pub const BATCH_DEADLINE: Duration = Duration::from_secs(120);

/// Run one blocking job per item on a fixed-size pool of OS threads,
/// sized to the host's available parallelism.
///
/// Results arrive unordered; callers re-sort by key before display. The
/// first failing job abandons the whole batch, as does blowing the
/// deadline. There is no partial-results path and nothing is retried.
pub fn map_parallel<I, T, F>(items: Vec<I>, deadline: Duration, job: F) -> Result<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Result<T> + Send + Sync + 'static,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let workers = pool_size(total);
    debug!(total, workers, "dispatching batch");

    let queue = Arc::new(Mutex::new(VecDeque::from(items)));
    let cancelled = Arc::new(AtomicBool::new(false));
    let job = Arc::new(job);
    let (tx, rx) = mpsc::channel();

    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let cancelled = Arc::clone(&cancelled);
        let job = Arc::clone(&job);
        let tx = tx.clone();
        thread::spawn(move || {
            loop {
                if cancelled.load(Ordering::Relaxed) {
                    break;
                }
                let item = match queue.lock() {
                    Ok(mut q) => q.pop_front(),
                    Err(_) => break,
                };
                let Some(item) = item else { break };
                if tx.send((*job)(item)).is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    let start = Instant::now();
    let mut results = Vec::with_capacity(total);
    while results.len() < total {
        let remaining = match deadline.checked_sub(start.elapsed()) {
            Some(d) => d,
            None => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(Error::Timeout { waited: deadline });
            }
        };
        match rx.recv_timeout(remaining) {
            Ok(Ok(value)) => results.push(value),
            Ok(Err(e)) => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(e);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(Error::Timeout { waited: deadline });
            }
            // Every queued item either reports a result or the sender
            // hangs up after a panic; only the latter lands here.
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                panic!("worker thread panicked before completing the batch")
            }
        }
    }
    Ok(results)
}

fn pool_size(total: usize) -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(DEFAULT_CONCURRENCY)
        .min(total)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_every_item() {
        let mut out =
            map_parallel((0..100).collect(), BATCH_DEADLINE, |n: i32| Ok(n * 2)).unwrap();
        out.sort_unstable();
        assert_eq!(out.len(), 100);
        assert_eq!(out[0], 0);
        assert_eq!(out[99], 198);
    }

    #[test]
    fn test_empty_batch() {
        let out: Vec<i32> = map_parallel(Vec::new(), BATCH_DEADLINE, |n: i32| Ok(n)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_first_failure_abandons_batch() {
        let result = map_parallel((0..50).collect(), BATCH_DEADLINE, |n: i32| {
            if n == 13 {
                Err(Error::NoData {
                    node: format!("db{}", n),
                    metric: "disk_use".into(),
                })
            } else {
                Ok(n)
            }
        });
        assert!(matches!(result, Err(Error::NoData { .. })));
    }

    #[test]
    fn test_deadline_abandons_batch() {
        let result = map_parallel(
            (0..8).collect(),
            Duration::from_millis(20),
            |n: i32| {
                thread::sleep(Duration::from_millis(200));
                Ok(n)
            },
        );
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[test]
    fn test_pool_size_bounds() {
        assert_eq!(pool_size(1), 1);
        assert!(pool_size(1000) >= 1);
        assert!(pool_size(2) <= 2);
    }
}
