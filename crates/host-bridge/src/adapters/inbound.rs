//! Host-to-page entry point.
//!
//! Everything the host sends back lands here: completions for text frames go
//! to the correlator, acknowledgements for binary frames go to the side
//! channel. The simulated host uses the same path.

use crate::domain::pending::CallbackCorrelator;
use bridge_bus::{EventPublisher, HostEvent, SideChannelBus};
use bridge_types::HostCompletion;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes inbound host traffic.
#[derive(Clone)]
pub struct HostInbound {
    correlator: Arc<CallbackCorrelator>,
    bus: Arc<SideChannelBus>,
}

impl HostInbound {
    pub fn new(correlator: Arc<CallbackCorrelator>, bus: Arc<SideChannelBus>) -> Self {
        Self { correlator, bus }
    }

    /// Fresh correlator and bus.
    pub fn standalone() -> Self {
        Self::new(
            Arc::new(CallbackCorrelator::new()),
            Arc::new(SideChannelBus::new()),
        )
    }

    /// Handle a raw completion as the shell delivers it.
    ///
    /// `data` is the JSON text `{"callbackId": ..., "result": ...}`. Payloads
    /// that do not parse are logged and dropped. Returns true if a pending
    /// call was resolved.
    pub fn receive_from_host(&self, action: &str, data: &str) -> bool {
        match HostCompletion::from_json(data) {
            Ok(completion) => {
                debug!(action, callback_id = %completion.callback_id, "Host completion received");
                self.complete(completion)
            }
            Err(e) => {
                warn!(action, error = %e, "Malformed host completion dropped");
                false
            }
        }
    }

    /// Handle an already-parsed completion.
    pub fn complete(&self, completion: HostCompletion) -> bool {
        self.correlator
            .complete(&completion.callback_id, completion.result)
    }

    /// Publish a side-channel acknowledgement.
    ///
    /// Returns the number of listeners that saw it.
    pub async fn dispatch_event(&self, event: HostEvent) -> usize {
        self.bus.publish(event).await
    }

    /// Parse and publish a side-channel acknowledgement sent as JSON text.
    pub async fn receive_event(&self, data: &str) -> usize {
        match serde_json::from_str::<HostEvent>(data) {
            Ok(event) => self.dispatch_event(event).await,
            Err(e) => {
                warn!(error = %e, "Malformed side-channel event dropped");
                0
            }
        }
    }

    pub fn correlator(&self) -> &Arc<CallbackCorrelator> {
        &self.correlator
    }

    pub fn bus(&self) -> &Arc<SideChannelBus> {
        &self.bus
    }
}
