//! # Chunked Upload Scenarios
//!
//! Large payloads over a binary channel and over the base64 fallback,
//! chunk ordering, lost acknowledgements and listener cleanup.

#[cfg(test)]
mod tests {
    use crate::fixtures::{binary_bridge, fast_config, payload, text_bridge, Frame};
    use host_bridge::{
        BinaryChunkUploader, HostFileSystem, LocalFile, UploadError, UploadRequest,
    };

    const MIB: usize = 1_048_576;

    fn request(name: &str, size: usize) -> UploadRequest {
        UploadRequest {
            file_name: name.to_string(),
            sub_dir: "panoramas".to_string(),
            content_type: "image/jpeg".to_string(),
            payload: payload(size),
        }
    }

    #[tokio::test]
    async fn test_binary_chunks_arrive_in_order() {
        bridge_telemetry::init_test_logging();
        let (bridge, host) = binary_bridge(fast_config(MIB), None);
        let uploader = BinaryChunkUploader::new(bridge.clone());
        let req = request("hall.jpg", 3 * MIB + MIB / 2);

        let path = uploader.save_large(&req).await.unwrap();

        assert!(path.starts_with("assets/panoramas/"));
        assert!(path.ends_with("-hall.jpg"));
        assert_eq!(host.binary_chunks(), vec![0, 1, 2, 3]);
        assert_eq!(host.methods(), vec!["initChunkUpload", "completeChunkUpload"]);

        // completeChunkUpload only after the last chunk frame
        let frames = host.frames.lock().clone();
        let last_chunk = frames
            .iter()
            .rposition(|f| matches!(f, Frame::Binary { .. }))
            .unwrap();
        assert_eq!(
            frames[last_chunk + 1],
            Frame::Text {
                method: "completeChunkUpload".to_string()
            }
        );
        assert!(matches!(frames[last_chunk], Frame::Binary { len, .. } if len == MIB / 2));

        assert_eq!(host.simulator.stored_file(&path).unwrap(), req.payload);
        assert_eq!(host.simulator.open_sessions(), 0);
        assert_eq!(bridge.bus().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_base64_fallback_uses_upload_chunk_calls() {
        let (bridge, host) = text_bridge(fast_config(MIB));
        let uploader = BinaryChunkUploader::new(bridge);
        let req = request("garden.jpg", 3 * MIB + 1);

        let path = uploader.save_large(&req).await.unwrap();

        assert_eq!(
            host.methods(),
            vec![
                "initChunkUpload",
                "uploadChunk",
                "uploadChunk",
                "uploadChunk",
                "uploadChunk",
                "completeChunkUpload",
            ]
        );
        assert!(host.binary_chunks().is_empty());
        assert_eq!(host.simulator.stored_file(&path).unwrap(), req.payload);
    }

    #[tokio::test]
    async fn test_payload_at_chunk_size_is_saved_in_one_shot() {
        let (bridge, host) = binary_bridge(fast_config(MIB), None);
        let uploader = BinaryChunkUploader::new(bridge);
        let req = request("exact.jpg", MIB);

        let path = uploader.save_large(&req).await.unwrap();

        assert_eq!(host.methods(), vec!["prepareFileBinary"]);
        let frames = host.frames.lock().clone();
        assert!(matches!(
            &frames[1],
            Frame::Binary { chunk_index: None, len, .. } if *len == MIB
        ));
        assert_eq!(host.simulator.stored_file(&path).unwrap(), req.payload);
    }

    #[tokio::test]
    async fn test_lost_chunk_ack_aborts_upload() {
        let (bridge, host) = binary_bridge(fast_config(MIB), Some(2));
        let uploader = BinaryChunkUploader::new(bridge.clone());
        let req = request("lost.jpg", 3 * MIB + MIB / 2);

        let err = uploader.save_large(&req).await.unwrap_err();

        match err {
            UploadError::ChunkTimeout { chunk_index, .. } => assert_eq!(chunk_index, 2),
            other => panic!("expected chunk timeout, got {other:?}"),
        }
        // Nothing sent past the lost chunk
        assert_eq!(host.binary_chunks(), vec![0, 1, 2]);
        assert_eq!(host.methods(), vec!["initChunkUpload"]);
        assert_eq!(bridge.bus().subscriber_count(), 0);
        assert_eq!(host.simulator.open_sessions(), 1);
        assert!(host.simulator.stored_paths("assets/panoramas/").is_empty());
    }

    #[tokio::test]
    async fn test_facade_reports_failed_large_upload_as_none() {
        let (bridge, host) = binary_bridge(fast_config(MIB), Some(0));
        let fs = HostFileSystem::new(bridge.clone());
        let file = LocalFile::new("broken.jpg", 1_700_000_000_000, payload(2 * MIB));

        assert_eq!(fs.save_file_large(&file, "panoramas", None).await, None);
        assert_eq!(host.binary_chunks(), vec![0]);
        assert_eq!(bridge.bus().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_small_save_with_rename() {
        let (bridge, host) = text_bridge(fast_config(MIB));
        let fs = HostFileSystem::new(bridge);
        let file = LocalFile::new("IMG_0001.jpg", 1_700_000_000_000, payload(4096));

        let path = fs.save_file(&file, "hotspots", Some("door.jpg")).await.unwrap();

        assert!(path.starts_with("assets/hotspots/"));
        assert!(path.ends_with("-door.jpg"));
        assert_eq!(host.methods(), vec!["saveFile"]);
        assert_eq!(host.simulator.stored_file(&path).unwrap(), file.bytes);
    }
}
