//! # Event Publisher
//!
//! Defines the publishing side of the side channel.

use crate::events::{AckFilter, HostEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Trait for publishing acknowledgements onto the side channel.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event.
    ///
    /// # Returns
    ///
    /// The number of live subscriptions that received the event.
    async fn publish(&self, event: HostEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-process side channel.
///
/// Uses `tokio::sync::broadcast`; each subscription filters for its own
/// acknowledgement tuple.
pub struct SideChannelBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<HostEvent>,

    /// Live subscription count by file id.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl SideChannelBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register a listener for one acknowledgement.
    ///
    /// Events published after this call are visible to the subscription, so
    /// call it before posting the frame being acknowledged.
    #[must_use]
    pub fn subscribe(&self, filter: AckFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let key = filter.file_id.clone();

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(key.clone()).or_insert(0) += 1;
        }

        debug!(file_id = %filter.file_id, chunk_index = ?filter.chunk_index, kind = ?filter.kind, "Ack listener registered");

        Subscription::new(receiver, filter, self.subscriptions.clone(), key)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Number of live subscriptions waiting on acks for `file_id`.
    #[must_use]
    pub fn listeners_for(&self, file_id: &str) -> usize {
        self.subscriptions
            .read()
            .ok()
            .and_then(|subs| subs.get(file_id).copied())
            .unwrap_or(0)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SideChannelBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for SideChannelBus {
    async fn publish(&self, event: HostEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(receivers, "Side-channel event published");
                receivers
            }
            Err(broadcast::error::SendError(event)) => {
                // Nobody is waiting: late ack after a timeout, or an unsolicited event.
                debug!(
                    file_id = %event.file_id,
                    chunk_index = ?event.chunk_index,
                    method = ?event.method,
                    "Side-channel event dropped (no listeners)"
                );
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
