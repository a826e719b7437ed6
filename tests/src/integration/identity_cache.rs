//! # Identity Cache Scenarios
//!
//! Re-saving an identical local file reuses the host's copy.

#[cfg(test)]
mod tests {
    use crate::fixtures::{binary_bridge, fast_config, payload, text_bridge};
    use host_bridge::{HostFileSystem, LocalFile};

    #[tokio::test]
    async fn test_second_save_reuses_cached_path() {
        bridge_telemetry::init_test_logging();
        let (bridge, host) = text_bridge(fast_config(1024));
        let fs = HostFileSystem::new(bridge);
        let file = LocalFile::new("lobby.jpg", 1_700_000_000_000, payload(512));

        let first = fs.save_file_with_cache(&file, "panoramas", None).await.unwrap();
        assert_eq!(
            host.methods(),
            vec!["checkFileExists", "saveFile", "registerFileCache"]
        );

        host.frames.lock().clear();
        let second = fs.save_file_with_cache(&file, "panoramas", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(host.methods(), vec!["checkFileExists"]);
        assert_eq!(host.simulator.stored_paths("assets/panoramas/"), vec![first]);
    }

    #[tokio::test]
    async fn test_same_name_size_and_mtime_share_one_upload() {
        let (bridge, host) = text_bridge(fast_config(1024));
        let fs = HostFileSystem::new(bridge);
        let a = LocalFile::new("lobby.jpg", 1_700_000_000_000, vec![1u8; 256]);
        let b = LocalFile::new("lobby.jpg", 1_700_000_000_000, vec![2u8; 256]);

        let first = fs.save_file_with_cache(&a, "panoramas", None).await.unwrap();
        let second = fs.save_file_with_cache(&b, "panoramas", None).await.unwrap();

        assert_eq!(first, second);
        let uploads = host.methods().iter().filter(|m| *m == "saveFile").count();
        assert_eq!(uploads, 1);
        assert_eq!(host.simulator.stored_file(&first).unwrap(), a.bytes);
    }

    #[tokio::test]
    async fn test_cache_is_scoped_to_sub_dir() {
        let (bridge, host) = text_bridge(fast_config(1024));
        let fs = HostFileSystem::new(bridge);
        let icon = LocalFile::new("icon.png", 1_700_000_000_000, payload(128))
            .with_content_type("image/png");

        let in_panoramas = fs.save_file_with_cache(&icon, "panoramas", None).await.unwrap();
        host.frames.lock().clear();
        let in_hotspots = fs.save_file_with_cache(&icon, "hotspots", None).await.unwrap();

        assert!(in_hotspots.starts_with("assets/hotspots/"));
        assert_ne!(in_panoramas, in_hotspots);
        assert_eq!(
            host.methods(),
            vec!["checkFileExists", "saveFile", "registerFileCache"]
        );

        // Each directory now serves its own copy
        host.frames.lock().clear();
        assert_eq!(
            fs.save_file_with_cache(&icon, "panoramas", None).await.unwrap(),
            in_panoramas
        );
        assert_eq!(
            fs.save_file_with_cache(&icon, "hotspots", None).await.unwrap(),
            in_hotspots
        );
        assert_eq!(host.methods(), vec!["checkFileExists", "checkFileExists"]);
    }

    #[tokio::test]
    async fn test_modified_file_is_uploaded_again() {
        let (bridge, host) = text_bridge(fast_config(1024));
        let fs = HostFileSystem::new(bridge);
        let original = LocalFile::new("lobby.jpg", 1_700_000_000_000, payload(512));
        let edited = LocalFile::new("lobby.jpg", 1_700_000_050_000, payload(512));

        fs.save_file_with_cache(&original, "panoramas", None).await.unwrap();
        host.frames.lock().clear();
        fs.save_file_with_cache(&edited, "panoramas", None).await.unwrap();

        assert_eq!(
            host.methods(),
            vec!["checkFileExists", "saveFile", "registerFileCache"]
        );
    }

    #[tokio::test]
    async fn test_cached_large_file_skips_chunk_session() {
        let (bridge, host) = binary_bridge(fast_config(1024), None);
        let fs = HostFileSystem::new(bridge);
        let file = LocalFile::new("tour.mp4", 1_700_000_000_000, payload(4000))
            .with_content_type("video/mp4");

        let first = fs.save_file_with_cache(&file, "videos", None).await.unwrap();
        assert_eq!(host.binary_chunks(), vec![0, 1, 2, 3]);

        host.frames.lock().clear();
        let second = fs.save_file_with_cache(&file, "videos", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(host.methods(), vec!["checkFileExists"]);
        assert!(host.binary_chunks().is_empty());
    }
}
