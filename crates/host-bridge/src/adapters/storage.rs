//! Key-value stores backing the simulated host.

use crate::ports::outbound::{KVStoreError, KeyValueStore};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// In-memory store. Contents vanish with the process.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}

/// Single-file persistent store.
///
/// The whole map is loaded on open and rewritten on every mutation, through
/// a temp file and a rename. Layout: `[key_len:u32 LE][key][value_len:u32 LE][value]...`
pub struct FileBackedKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating it on first write.
    ///
    /// A missing file is an empty store; a truncated or garbled one is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match std::fs::File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(io_error)?;
                decode(&bytes)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(io_error(e)),
        };

        info!(path = %path.display(), keys = data.len(), "Opened simulator store");
        Ok(Self { data, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Undo a mutation whose flush failed, so memory matches disk.
    fn restore(&mut self, key: &[u8], previous: Option<Vec<u8>>) {
        match previous {
            Some(value) => self.data.insert(key.to_vec(), value),
            None => self.data.remove(key),
        };
        warn!(path = %self.path.display(), "Store flush failed; mutation rolled back");
    }

    fn save_to_file(&self) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let bytes = encode(&self.data)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Flushed simulator store");
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        let previous = self.data.insert(key.to_vec(), value.to_vec());
        if let Err(e) = self.save_to_file() {
            self.restore(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        if let Some(previous) = self.data.remove(key) {
            if let Err(e) = self.save_to_file() {
                self.restore(key, Some(previous));
                return Err(e);
            }
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}

fn scan(data: &HashMap<Vec<u8>, Vec<u8>>, prefix: &[u8]) -> Vec<Vec<u8>> {
    data.keys()
        .filter(|k| k.starts_with(prefix))
        .cloned()
        .collect()
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

fn encode(data: &HashMap<Vec<u8>, Vec<u8>>) -> Result<Vec<u8>, KVStoreError> {
    let mut bytes = Vec::new();
    for (key, value) in data {
        for field in [key, value] {
            let len = u32::try_from(field.len()).map_err(|_| KVStoreError::IOError {
                message: format!("entry of {} bytes exceeds the store format", field.len()),
            })?;
            bytes.extend_from_slice(&len.to_le_bytes());
            bytes.extend_from_slice(field);
        }
    }
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> Result<HashMap<Vec<u8>, Vec<u8>>, KVStoreError> {
    let mut data = HashMap::new();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let key = read_field(bytes, &mut cursor)?;
        let value = read_field(bytes, &mut cursor)?;
        data.insert(key, value);
    }

    Ok(data)
}

fn read_field(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let truncated = |at: usize| KVStoreError::Corrupted {
        message: format!("truncated entry at offset {at}"),
    };

    let len_end = cursor.checked_add(4).filter(|end| *end <= bytes.len()).ok_or(truncated(*cursor))?;
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[*cursor..len_end]);
    let len = u32::from_le_bytes(len_bytes) as usize;

    let end = len_end.checked_add(len).filter(|end| *end <= bytes.len()).ok_or(truncated(len_end))?;
    let field = bytes[len_end..end].to_vec();
    *cursor = end;
    Ok(field)
}
