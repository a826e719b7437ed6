//! # Correlation Scenarios
//!
//! Concurrent calls, completions in arbitrary order, and stray completions
//! that match nothing.

#[cfg(test)]
mod tests {
    use crate::fixtures::fast_config;
    use bridge_types::HostMessage;
    use host_bridge::{HostBindings, HostBridge, HostChannel, TransportError};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    /// Host that only records messages; the test answers them by hand.
    #[derive(Default)]
    struct ManualHost {
        inbox: Mutex<Vec<HostMessage>>,
    }

    impl HostChannel for ManualHost {
        fn post_message(&self, message: &str) -> Result<(), TransportError> {
            let parsed = HostMessage::from_json(message)
                .map_err(|e| TransportError::Rejected(e.to_string()))?;
            self.inbox.lock().push(parsed);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_get_their_own_results() {
        bridge_telemetry::init_test_logging();
        let bridge = Arc::new(HostBridge::connect(fast_config(1024), HostBindings::empty()).unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let bridge = bridge.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("scene_{i}.json");
                let saved = bridge
                    .call_host("saveJsonFile", json!({"fileName": name, "data": {"id": i}}))
                    .await
                    .unwrap();
                assert_eq!(saved, json!(true));
                bridge
                    .call_host("readJsonFile", json!({"fileName": name}))
                    .await
                    .unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), json!({"id": i}));
        }
        assert_eq!(bridge.correlator().pending_count(), 0);
        assert_eq!(bridge.correlator().stats().completed(), 32);
        assert_eq!(bridge.correlator().stats().unmatched(), 0);
    }

    #[tokio::test]
    async fn test_completions_in_reverse_order() {
        let host = Arc::new(ManualHost::default());
        let bridge = Arc::new(
            HostBridge::connect(
                fast_config(1024),
                HostBindings::empty().with_notify_channel(host.clone()),
            )
            .unwrap(),
        );

        let calls: Vec<_> = (0..3)
            .map(|i| {
                let bridge = bridge.clone();
                tokio::spawn(async move {
                    bridge
                        .call_host("readJsonFile", json!({"fileName": format!("{i}.json")}))
                        .await
                        .unwrap()
                })
            })
            .collect();

        // Wait for all three messages to be posted
        while host.inbox.lock().len() < 3 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let messages: Vec<HostMessage> = host.inbox.lock().drain(..).collect();
        for message in messages.iter().rev() {
            let file_name = message.params["fileName"].clone();
            let payload = json!({"callbackId": message.callback_id, "result": {"file": file_name}});
            assert!(bridge
                .inbound()
                .receive_from_host("callback", &payload.to_string()));
        }

        for (i, call) in calls.into_iter().enumerate() {
            assert_eq!(call.await.unwrap(), json!({"file": format!("{i}.json")}));
        }
    }

    #[tokio::test]
    async fn test_stray_completions_are_dropped() {
        let host = Arc::new(ManualHost::default());
        let bridge = Arc::new(
            HostBridge::connect(
                fast_config(1024),
                HostBindings::empty().with_legacy_bridge(host.clone()),
            )
            .unwrap(),
        );

        let pending = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.call_host("deleteFile", json!({"path": "a.json"})).await })
        };
        while host.inbox.lock().is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let id = host.inbox.lock()[0].callback_id.clone();

        let inbound = bridge.inbound();
        assert!(!inbound.receive_from_host("callback", r#"{"callbackId":"cb_4242","result":true}"#));
        assert!(!inbound.receive_from_host("callback", "{broken"));
        assert_eq!(bridge.correlator().pending_count(), 1);

        let answer = json!({"callbackId": id, "result": true}).to_string();
        assert!(inbound.receive_from_host("callback", &answer));
        assert!(!inbound.receive_from_host("callback", &answer));

        assert_eq!(pending.await.unwrap().unwrap(), Value::Bool(true));
        assert_eq!(bridge.correlator().stats().unmatched(), 2);
        assert_eq!(bridge.correlator().pending_count(), 0);
    }
}
