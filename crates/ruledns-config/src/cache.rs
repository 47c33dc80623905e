// ── Zone-id cache ──
//
// Zone names map to ids that never change for the life of the zone, so
// the CLI remembers them in a small JSON file instead of hitting the
// zones endpoint on every run. A missing file is an empty cache.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCache {
    path: PathBuf,
    zones: BTreeMap<String, String>,
}

impl ZoneCache {
    /// Open the cache at the platform cache path.
    pub fn open_default() -> Result<Self, ConfigError> {
        Self::open(&crate::cache_path())
    }

    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let zones = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = zones.len(), "zone cache loaded");
        Ok(Self {
            path: path.to_path_buf(),
            zones,
        })
    }

    pub fn get(&self, zone_name: &str) -> Option<&str> {
        self.zones.get(&zone_key(zone_name)).map(String::as_str)
    }

    /// Record a lookup. Returns `true` if the cache changed.
    pub fn insert(&mut self, zone_name: &str, zone_id: &str) -> bool {
        let key = zone_key(zone_name);
        if self.zones.get(&key).map(String::as_str) == Some(zone_id) {
            return false;
        }
        self.zones.insert(key, zone_id.to_owned());
        true
    }

    /// Forget a zone (e.g. after the provider reports it gone).
    pub fn remove(&mut self, zone_name: &str) -> bool {
        self.zones.remove(&zone_key(zone_name)).is_some()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.zones)?)?;
        Ok(())
    }
}

fn zone_key(zone_name: &str) -> String {
    zone_name.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ZoneCache::open(&dir.path().join("zones.json")).unwrap();
        assert_eq!(cache.get("example.com"), None);
    }

    #[test]
    fn entries_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("zones.json");

        let mut cache = ZoneCache::open(&path).unwrap();
        assert!(cache.insert("Example.COM.", "023e105f4ecef8ad9ca31a8372d0c353"));
        assert!(!cache.insert("example.com", "023e105f4ecef8ad9ca31a8372d0c353"));
        cache.save().unwrap();

        let reloaded = ZoneCache::open(&path).unwrap();
        assert_eq!(
            reloaded.get("example.com"),
            Some("023e105f4ecef8ad9ca31a8372d0c353")
        );
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(ZoneCache::open(&path), Err(ConfigError::Cache(_))));
    }

    #[test]
    fn remove_forgets_zone() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = ZoneCache::open(&dir.path().join("zones.json")).unwrap();
        cache.insert("example.com", "z1");
        assert!(cache.remove("example.com"));
        assert!(!cache.remove("example.com"));
    }
}
