//! Cache Store (component F). One file per key under the configured cache
//! directory, named by the lowercase hex SHA-256 of the logical key string
//! — the same content-addressing idiom the teacher's `database`/
//! `app-data-hash` crates use for stable, collision-resistant names.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache entry corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub value: serde_json::Value,
    pub fetched_at_unix: u64,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub enum Lookup {
    Fresh(Entry),
    Stale(Entry),
    Miss,
}

pub struct CacheStore {
    dir: PathBuf,
}

pub fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CacheStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();
        self.dir.join(hex::encode(digest))
    }

    /// Absence and any read/parse failure are both treated as a miss — a
    /// concurrent writer's partially-written file must never surface as an
    /// error to a reader.
    fn read_entry(path: &Path) -> Option<Entry> {
        let bytes = std::fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn get(&self, key: &str, now: u64, max_stale_seconds: u64) -> Lookup {
        let Some(entry) = Self::read_entry(&self.path_for(key)) else {
            return Lookup::Miss;
        };
        let expires_at = entry.fetched_at_unix.saturating_add(entry.ttl_seconds);
        if expires_at > now {
            Lookup::Fresh(entry)
        } else if expires_at.saturating_add(max_stale_seconds) >= now {
            Lookup::Stale(entry)
        } else {
            Lookup::Miss
        }
    }

    pub fn put(&self, key: &str, value: serde_json::Value, ttl_seconds: u64, fetched_at_unix: u64) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        let entry = Entry { value, fetched_at_unix, ttl_seconds };
        let body = serde_json::to_vec(&entry)?;

        let final_path = self.path_for(key);
        let mut tmp_path = final_path.clone();
        tmp_path.set_extension(format!("tmp-{}", std::process::id()));

        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(&body)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn miss_on_absent_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        assert!(matches!(store.get("nope", 1000, 100), Lookup::Miss));
    }

    #[test]
    fn fresh_then_stale_then_miss_by_clock() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.put("k", json!({"a": 1}), 60, 1000).unwrap();

        assert!(matches!(store.get("k", 1030, 600), Lookup::Fresh(_)));
        assert!(matches!(store.get("k", 1200, 600), Lookup::Stale(_)));
        assert!(matches!(store.get("k", 5000, 600), Lookup::Miss));
    }

    #[test]
    fn zero_ttl_is_always_stale_not_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.put("k", json!({"a": 1}), 0, 1000).unwrap();
        assert!(matches!(store.get("k", 1000, 600), Lookup::Stale(_)));
    }

    #[test]
    fn corrupt_file_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        std::fs::create_dir_all(dir.path()).unwrap();
        let path = store.path_for("k");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(store.get("k", 1000, 600), Lookup::Miss));
    }
}
