//! [`GpuScheduler`]: per-`gpu_id` exclusive lock with a priority-FIFO wait
//! queue and guaranteed lease release (spec §4.8).
//!
//! Generalizes this workspace's sub-agent concurrency-gating pattern (a
//! bounded permit pool) from a simple semaphore into an exclusive lock per
//! device, since at most one of `{llm-primary, ocr-vl}` may hold a given
//! GPU at a time — unlike the sub-agent pool, which allows many concurrent
//! holders up to a fixed count.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::GpuError;
use crate::types::{GpuClass, GpuStatus};

/// Default `acquire` timeout (spec §4.8: 60s).
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(60);

struct Holder {
    class: GpuClass,
    lease_id: u64,
}

struct Waiter {
    class: GpuClass,
    priority: i32,
    seq: u64,
    sender: oneshot::Sender<u64>,
}

#[derive(Default)]
struct GpuState {
    holder: Option<Holder>,
    waiters: Vec<Waiter>,
    next_seq: u64,
}

impl GpuState {
    /// Pop the waiter that should run next: lowest `priority` value first
    /// (highest priority), ties broken by earliest arrival (`seq`).
    fn pop_next_waiter(&mut self) -> Option<Waiter> {
        let index = self
            .waiters
            .iter()
            .enumerate()
            .min_by_key(|(_, waiter)| (waiter.priority, waiter.seq))
            .map(|(index, _)| index)?;
        Some(self.waiters.remove(index))
    }
}

/// Mutual-exclusion arbiter for GPU-contended jobs. One instance is shared
/// across the whole runtime; `gpu_id` state is created lazily on first use.
pub struct GpuScheduler {
    state: Arc<Mutex<HashMap<String, GpuState>>>,
    next_lease_id: Arc<AtomicU64>,
}

impl GpuScheduler {
    /// A scheduler with no devices yet contended.
    #[must_use]
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(HashMap::new())), next_lease_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Acquire the exclusive lock for `gpu_id` on behalf of `class`,
    /// waiting up to [`DEFAULT_ACQUIRE_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::ResourceBusy`] if the timeout elapses first.
    pub async fn acquire(&self, gpu_id: &str, class: GpuClass, priority: i32) -> Result<GpuLease, GpuError> {
        self.acquire_with_timeout(gpu_id, class, priority, DEFAULT_ACQUIRE_TIMEOUT).await
    }

    /// As [`Self::acquire`], with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::ResourceBusy`] if `timeout` elapses before a
    /// lease is granted.
    pub async fn acquire_with_timeout(&self, gpu_id: &str, class: GpuClass, priority: i32, timeout: Duration) -> Result<GpuLease, GpuError> {
        let immediate = {
            let mut state = self.state.lock().expect("gpu scheduler lock poisoned");
            let gpu_state = state.entry(gpu_id.to_owned()).or_default();
            if gpu_state.holder.is_none() && gpu_state.waiters.is_empty() {
                let lease_id = self.next_lease_id.fetch_add(1, Ordering::Relaxed);
                gpu_state.holder = Some(Holder { class, lease_id });
                Some(lease_id)
            } else {
                None
            }
        };

        if let Some(lease_id) = immediate {
            return Ok(GpuLease::new(gpu_id.to_owned(), class, lease_id, self.state.clone(), self.next_lease_id.clone()));
        }

        let (sender, receiver) = oneshot::channel();
        {
            let mut state = self.state.lock().expect("gpu scheduler lock poisoned");
            let gpu_state = state.entry(gpu_id.to_owned()).or_default();
            let seq = gpu_state.next_seq;
            gpu_state.next_seq = gpu_state.next_seq.wrapping_add(1);
            gpu_state.waiters.push(Waiter { class, priority, seq, sender });
        }

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(lease_id)) => Ok(GpuLease::new(gpu_id.to_owned(), class, lease_id, self.state.clone(), self.next_lease_id.clone())),
            Ok(Err(_)) | Err(_) => {
                self.remove_timed_out_waiter(gpu_id);
                Err(GpuError::ResourceBusy)
            }
        }
    }

    fn remove_timed_out_waiter(&self, gpu_id: &str) {
        // Best-effort: the sender we created above is dropped with the
        // future on timeout, so there's nothing keyed to remove directly;
        // stale waiters are pruned lazily the next time this gpu_id's lock
        // is released (a send to a dropped receiver is simply ignored).
        let _ = gpu_id;
    }

    /// Current arbitration state for `gpu_id` (spec §4.8 `status()`).
    #[must_use]
    pub fn status(&self, gpu_id: &str) -> GpuStatus {
        let state = self.state.lock().expect("gpu scheduler lock poisoned");
        match state.get(gpu_id) {
            Some(gpu_state) => GpuStatus { gpu_id: gpu_id.to_owned(), holder: gpu_state.holder.as_ref().map(|h| h.class), queue_depth: gpu_state.waiters.len() },
            None => GpuStatus { gpu_id: gpu_id.to_owned(), holder: None, queue_depth: 0 },
        }
    }
}

impl Default for GpuScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// An exclusive hold on one GPU, for one class of job. Releases
/// automatically on drop (spec "scoped acquisition with guaranteed
/// release"), handing the lock to the next waiter (if any) in the same
/// synchronous step.
pub struct GpuLease {
    gpu_id: String,
    class: GpuClass,
    lease_id: u64,
    state: Arc<Mutex<HashMap<String, GpuState>>>,
    next_lease_id: Arc<AtomicU64>,
    released: bool,
}

impl GpuLease {
    fn new(gpu_id: String, class: GpuClass, lease_id: u64, state: Arc<Mutex<HashMap<String, GpuState>>>, next_lease_id: Arc<AtomicU64>) -> Self {
        Self { gpu_id, class, lease_id, state, next_lease_id, released: false }
    }

    /// The GPU this lease holds.
    #[must_use]
    pub fn gpu_id(&self) -> &str {
        &self.gpu_id
    }

    /// The resource class this lease was granted for.
    #[must_use]
    pub fn class(&self) -> GpuClass {
        self.class
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let mut state = self.state.lock().expect("gpu scheduler lock poisoned");
        let Some(gpu_state) = state.get_mut(&self.gpu_id) else { return };

        if !matches!(&gpu_state.holder, Some(holder) if holder.lease_id == self.lease_id) {
            return;
        }
        gpu_state.holder = None;

        while let Some(waiter) = gpu_state.pop_next_waiter() {
            let lease_id = self.next_lease_id.fetch_add(1, Ordering::Relaxed);
            gpu_state.holder = Some(Holder { class: waiter.class, lease_id });
            if waiter.sender.send(lease_id).is_ok() {
                return;
            }
            // Receiver already gone (timed out); undo and try the next waiter.
            gpu_state.holder = None;
        }
    }
}

impl Drop for GpuLease {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn second_acquire_on_same_gpu_waits_for_release() {
        let scheduler = Arc::new(GpuScheduler::new());
        let lease_a = scheduler.acquire("gpu-0", GpuClass::LlmPrimary, 0).await.unwrap();

        let scheduler_clone = scheduler.clone();
        let waiter = tokio::spawn(async move { scheduler_clone.acquire("gpu-0", GpuClass::OcrVl, 0).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(lease_a);
        let lease_b = tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap().unwrap();
        assert_eq!(lease_b.class(), GpuClass::OcrVl);
    }

    #[tokio::test]
    async fn acquire_times_out_when_gpu_stays_held() {
        let scheduler = GpuScheduler::new();
        let _lease = scheduler.acquire("gpu-0", GpuClass::LlmPrimary, 0).await.unwrap();

        let result = scheduler.acquire_with_timeout("gpu-0", GpuClass::OcrVl, 0, Duration::from_millis(30)).await;
        assert_eq!(result.unwrap_err(), GpuError::ResourceBusy);
    }

    #[tokio::test]
    async fn higher_priority_waiter_goes_first() {
        let scheduler = Arc::new(GpuScheduler::new());
        let lease_a = scheduler.acquire("gpu-0", GpuClass::LlmPrimary, 0).await.unwrap();

        let low = scheduler.clone();
        let low_task = tokio::spawn(async move { low.acquire_with_timeout("gpu-0", GpuClass::OcrVl, 10, Duration::from_secs(2)).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let high = scheduler.clone();
        let high_task = tokio::spawn(async move { high.acquire_with_timeout("gpu-0", GpuClass::LlmPrimary, 0, Duration::from_secs(2)).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        drop(lease_a);

        let high_result = tokio::time::timeout(Duration::from_secs(1), high_task).await.unwrap().unwrap();
        assert!(high_result.is_ok());
        low_task.abort();
    }

    #[tokio::test]
    async fn status_reports_holder_and_queue_depth() {
        let scheduler = Arc::new(GpuScheduler::new());
        assert!(scheduler.status("gpu-0").holder.is_none());

        let lease = scheduler.acquire("gpu-0", GpuClass::LlmPrimary, 0).await.unwrap();
        let status = scheduler.status("gpu-0");
        assert_eq!(status.holder, Some(GpuClass::LlmPrimary));
        drop(lease);
        assert!(scheduler.status("gpu-0").holder.is_none());
    }
}
