//! services/client/src/adapters/memory.rs
//!
//! In-memory implementations of the storage and remote-store ports, used by
//! the test suite and for ephemeral runs without a backend. The remote
//! adapter exposes failure switches so load/push error paths can be driven
//! deterministically.

use async_trait::async_trait;
use readshelf_core::domain::ReadingData;
use readshelf_core::ports::{
    LocalStorageService, NotificationRecord, PortError, PortResult, RemoteProfile,
    RemoteStoreService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

//=========================================================================================
// Local Storage
//=========================================================================================

/// A `LocalStorageService` backed by a plain map.
#[derive(Default)]
pub struct MemoryStorageAdapter {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocalStorageService for MemoryStorageAdapter {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

//=========================================================================================
// Remote Store
//=========================================================================================

/// A `RemoteStoreService` backed by in-memory maps, with per-operation
/// failure switches and counters for observing bridge behavior.
#[derive(Default)]
pub struct MemoryRemoteAdapter {
    profiles: Mutex<HashMap<String, RemoteProfile>>,
    notifications: Mutex<Vec<NotificationRecord>>,
    save_attempts: AtomicUsize,
    save_successes: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_save: AtomicBool,
}

impl MemoryRemoteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a profile record for a user.
    pub fn insert_profile(&self, user_id: &str, profile: RemoteProfile) {
        self.profiles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id.to_string(), profile);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// All notification records inserted so far.
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The currently stored profile for a user, if any.
    pub fn profile(&self, user_id: &str) -> Option<RemoteProfile> {
        self.profiles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(user_id)
            .cloned()
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub fn save_successes(&self) -> usize {
        self.save_successes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStoreService for MemoryRemoteAdapter {
    async fn fetch_profile(&self, user_id: &str) -> PortResult<Option<RemoteProfile>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("simulated fetch failure".to_string()));
        }
        Ok(self
            .profiles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(user_id)
            .cloned())
    }

    async fn save_reading_data(
        &self,
        user_id: &str,
        data: &ReadingData,
        reader_name: &str,
    ) -> PortResult<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("simulated save failure".to_string()));
        }
        let blob =
            serde_json::to_value(data).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.profiles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                user_id.to_string(),
                RemoteProfile {
                    reading_data: Some(blob),
                    reader_name: Some(reader_name.to_string()),
                },
            );
        self.save_successes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_notification(&self, record: NotificationRecord) -> PortResult<()> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record);
        Ok(())
    }
}
