//! Persistence for [`DriverState`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::DriverResult;
use crate::state::DriverState;

/// Somewhere driver state survives a restart.
pub trait StateStore {
    /// Load the saved state, or `None` when nothing was saved yet.
    fn load(&self) -> DriverResult<Option<DriverState>>;

    /// Replace the saved state.
    fn save(&mut self, state: &DriverState) -> DriverResult<()>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Option<DriverState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> DriverResult<Option<DriverState>> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &DriverState) -> DriverResult<()> {
        self.state = Some(state.clone());
        Ok(())
    }
}

/// Stores state as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> DriverResult<Option<DriverState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, state: &DriverState) -> DriverResult<()> {
        trace!("saving state to {}", self.path.display());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::AlarmParams;
    use crate::status::DeviceStatus;

    fn pending_alarm() -> DriverState {
        DriverState {
            status: DeviceStatus::DelayedAlarm,
            alarm_pending: true,
            scheduled_alarm: Some(AlarmParams { sound: 4, volume: 2, duration_secs: 10 }),
            is_configured: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.load().expect("load").is_none());
        store.save(&pending_alarm()).expect("save");
        assert_eq!(store.load().expect("load"), Some(pending_alarm()));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = JsonFileStore::new(dir.path().join("nested").join("siren.json"));
        assert!(store.load().expect("load").is_none());

        store.save(&pending_alarm()).expect("save");
        let reopened = JsonFileStore::new(store.path());
        assert_eq!(reopened.load().expect("load"), Some(pending_alarm()));
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("siren.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(JsonFileStore::new(&path).load().is_err());
    }
}
