//! # Ack Subscriber
//!
//! Defines the listening side of the side channel.

use crate::events::{AckFilter, HostEvent};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("side channel closed")]
    Closed,

    /// No matching event arrived before the deadline.
    #[error("no acknowledgement within {0:?}")]
    TimedOut(Duration),
}

/// A listener for one acknowledgement.
///
/// When dropped, the listener is deregistered from the bus.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<HostEvent>,

    /// Filter for this subscription.
    filter: AckFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// File id this subscription is counted under.
    key: String,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<HostEvent>,
        filter: AckFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            subscriptions,
            key,
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next matching event
    /// - `None` - The bus was dropped
    pub async fn recv(&mut self) -> Option<HostEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, file_id = %self.key, "Ack listener lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Wait for the first matching event, then deregister.
    ///
    /// The subscription is consumed either way, so a timed-out listener
    /// never lingers on the bus.
    pub async fn wait(mut self, timeout: Duration) -> Result<HostEvent, SubscriptionError> {
        match tokio::time::timeout(timeout, self.recv()).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => Err(SubscriptionError::Closed),
            Err(_) => Err(SubscriptionError::TimedOut(timeout)),
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &AckFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        if let Some(count) = subs.get_mut(&self.key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                subs.remove(&self.key);
            }
        }
        debug!(file_id = %self.key, "Ack listener released");
    }
}
