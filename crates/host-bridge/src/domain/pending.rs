//! Callback correlator.
//!
//! Maps `cb_<n>` ids of dispatched host messages to the tasks awaiting their
//! completions. Completions arrive in any order, possibly twice, possibly for
//! ids this process never issued.

use bridge_types::CorrelationId;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A call waiting for its completion
struct PendingCall {
    /// Channel to send the result
    sender: oneshot::Sender<Value>,
    /// When the call was registered
    created_at: Instant,
    /// Method name (for logging)
    method: String,
}

/// Statistics for the correlator
#[derive(Debug, Default)]
pub struct CorrelatorStats {
    /// Total calls registered
    pub registered: AtomicU64,
    /// Total calls resolved by a completion
    pub completed: AtomicU64,
    /// Completions for unknown, stale or already-resolved ids
    pub unmatched: AtomicU64,
    /// Calls removed without a completion (dispatch failed or caller gone)
    pub cancelled: AtomicU64,
}

impl CorrelatorStats {
    pub fn registered(&self) -> u64 {
        self.registered.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn unmatched(&self) -> u64 {
        self.unmatched.load(Ordering::Relaxed)
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Registry of in-flight host calls.
///
/// Flow:
/// 1. `call_host` calls `register()` and gets an id plus a oneshot receiver
/// 2. The message carrying the id is posted to the host
/// 3. The host's completion reaches `complete()` through `HostInbound`
/// 4. The waiting task wakes with the result
///
/// Each id resolves at most once. There is no timeout here; call sites that
/// need one wrap the receiver.
pub struct CallbackCorrelator {
    /// Map of correlation ID to pending call
    pending: DashMap<CorrelationId, PendingCall>,
    /// Last issued sequence number
    sequence: AtomicU64,
    /// Statistics
    stats: Arc<CorrelatorStats>,
}

impl CallbackCorrelator {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            sequence: AtomicU64::new(0),
            stats: Arc::new(CorrelatorStats::default()),
        }
    }

    /// Register a call and get a receiver for its result.
    ///
    /// Ids are `cb_1`, `cb_2`, ... and are never reused.
    pub fn register(&self, method: &str) -> (CorrelationId, oneshot::Receiver<Value>) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let correlation_id = CorrelationId::from_sequence(sequence);
        let (tx, rx) = oneshot::channel();

        let call = PendingCall {
            sender: tx,
            created_at: Instant::now(),
            method: method.to_string(),
        };

        self.pending.insert(correlation_id.clone(), call);
        self.stats.registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = %correlation_id,
            method = method,
            "Registered pending call"
        );

        (correlation_id, rx)
    }

    /// Resolve a pending call with the host's result.
    ///
    /// Returns true if the id was pending. Unknown, stale and duplicate ids
    /// are logged and dropped.
    pub fn complete(&self, correlation_id: &CorrelationId, result: Value) -> bool {
        let Some((_, call)) = self.pending.remove(correlation_id) else {
            self.stats.unmatched.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %correlation_id,
                "Completion for unknown or already-resolved callback id"
            );
            return false;
        };

        let elapsed = call.created_at.elapsed();
        match call.sender.send(result) {
            Ok(()) => {
                self.stats.completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    method = call.method,
                    response_time_ms = elapsed.as_millis(),
                    "Completed pending call"
                );
            }
            Err(_) => {
                // Caller stopped waiting; the id is still consumed.
                self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    method = call.method,
                    "Pending call receiver dropped"
                );
            }
        }
        true
    }

    /// Remove a call whose message never reached the host.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        if let Some((_, call)) = self.pending.remove(correlation_id) {
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(
                correlation_id = %correlation_id,
                method = call.method,
                "Cancelled pending call"
            );
            true
        } else {
            false
        }
    }

    /// Get number of currently pending calls
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    /// Get statistics
    pub fn stats(&self) -> &CorrelatorStats {
        &self.stats
    }
}

impl Default for CallbackCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
