//! services/client/src/bridge.rs
//!
//! The cloud sync bridge: a long-running task that reconciles the Local
//! Reading Store against the per-user remote record. On sign-in it clears
//! the store and hydrates it from the remote blob; once loaded, it debounces
//! store change events into full-snapshot pushes, and after every load and
//! successful push it diffs the badge evaluator's output against the
//! per-user notified set to emit unlock notifications exactly once.

use crate::state::AppState;
use crate::store::ReadingStore;
use futures::StreamExt;
use readshelf_core::badges::{badge_label, compute_unlocked_badges};
use readshelf_core::domain::ReadingData;
use readshelf_core::ports::{
    AuthEvent, AuthEventStream, LocalStorageService, NotificationRecord, RemoteProfile,
    RemoteStoreService, NOTIFICATION_BADGE_UNLOCKED,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Local-storage key for the best-effort shutdown fallback payload.
pub fn pending_save_key(user_id: &str) -> String {
    format!("readshelf.pending_save.{user_id}")
}

/// The per-session sync state: which user is tracked, and whether remote
/// hydration has completed. Mutations are never pushed before `has_loaded`
/// is set, so a slow load can't be clobbered by a blank local store.
#[derive(Debug, Clone, Default)]
struct SyncSession {
    user_id: Option<String>,
    has_loaded: bool,
}

/// The bridge between the Local Reading Store and the remote record.
pub struct SyncBridge {
    store: Arc<ReadingStore>,
    remote: Arc<dyn RemoteStoreService>,
    storage: Arc<dyn LocalStorageService>,
    debounce: Duration,
    session: Mutex<SyncSession>,
    push_in_flight: AtomicBool,
}

impl SyncBridge {
    pub fn new(
        store: Arc<ReadingStore>,
        remote: Arc<dyn RemoteStoreService>,
        storage: Arc<dyn LocalStorageService>,
        debounce: Duration,
    ) -> Self {
        Self {
            store,
            remote,
            storage,
            debounce,
            session: Mutex::new(SyncSession::default()),
            push_in_flight: AtomicBool::new(false),
        }
    }

    /// Builds a bridge from the wired application state.
    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.store.clone(),
            state.remote.clone(),
            state.storage.clone(),
            state.config.sync_debounce,
        )
    }

    fn session(&self) -> MutexGuard<'_, SyncSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn session_snapshot(&self) -> SyncSession {
        self.session().clone()
    }

    /// The main loop: reacts to auth transitions, store change events, the
    /// debounce deadline, and shutdown. All remote I/O happens inline in
    /// this single task, so pushes never overlap from here; the in-flight
    /// guard additionally covers an external `flush()` racing the loop.
    pub async fn run(self: Arc<Self>, mut auth_events: AuthEventStream, shutdown: CancellationToken) {
        let mut changes = self.store.subscribe();
        let mut deadline: Option<Instant> = None;
        info!("Sync bridge started.");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Sync bridge shutting down; flushing pending state.");
                    self.flush().await;
                    break;
                }
                event = auth_events.next() => {
                    match event {
                        Some(AuthEvent::SignedIn(user_id)) => {
                            deadline = None;
                            self.handle_sign_in(&user_id, &mut changes).await;
                        }
                        Some(AuthEvent::SignedOut) => {
                            deadline = None;
                            self.handle_sign_out();
                        }
                        None => {
                            info!("Auth event stream ended; stopping sync bridge.");
                            self.handle_sign_out();
                            break;
                        }
                    }
                }
                result = changes.changed() => {
                    if result.is_err() {
                        break;
                    }
                    let session = self.session_snapshot();
                    if session.has_loaded && session.user_id.is_some() {
                        // Timer reset, not accumulation: every mutation
                        // restarts the quiet period.
                        deadline = Some(Instant::now() + self.debounce);
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    if let Some(user_id) = self.session_snapshot().user_id {
                        self.push_and_notify(&user_id).await;
                    }
                }
            }
        }
    }

    /// Sign-in (or user switch): clear the store first so the new user never
    /// inherits in-memory state, then fetch and hydrate the remote record.
    /// On fetch failure nothing is loaded and mutations stay unpushed until
    /// the next sign-in.
    async fn handle_sign_in(&self, user_id: &str, changes: &mut watch::Receiver<u64>) {
        info!(user_id, "User signed in; loading remote reading state.");
        {
            let mut session = self.session();
            session.user_id = Some(user_id.to_string());
            session.has_loaded = false;
        }
        self.store.clear();

        match self.remote.fetch_profile(user_id).await {
            Ok(profile) => {
                let (data, reader_name) = hydrate_payload(profile);
                self.store.hydrate(data, reader_name);
                // Hydration (and the preceding clear) are not local
                // mutations; swallow their change events before arming the
                // push path.
                changes.borrow_and_update();
                self.session().has_loaded = true;
                info!(user_id, "Remote reading state loaded.");
                self.check_badges(user_id).await;
            }
            Err(e) => {
                error!(
                    user_id,
                    error = %e,
                    "Failed to load remote reading state; sync stays disabled for this session."
                );
            }
        }
    }

    fn handle_sign_out(&self) {
        info!("User signed out; clearing local reading state.");
        {
            let mut session = self.session();
            session.user_id = None;
            session.has_loaded = false;
        }
        self.store.clear();
    }

    /// Pushes a full snapshot to the remote record, then re-checks badges.
    /// A push already in flight suppresses this attempt rather than queuing
    /// it; the re-armed debounce covers the missed state.
    async fn push_and_notify(&self, user_id: &str) {
        if !self.session_snapshot().has_loaded {
            return;
        }
        if self.push_in_flight.swap(true, Ordering::AcqRel) {
            info!(user_id, "Push already in flight; skipping.");
            return;
        }

        let (data, reader_name) = self.store.snapshot();
        let result = self.remote.save_reading_data(user_id, &data, &reader_name).await;
        self.push_in_flight.store(false, Ordering::Release);

        match result {
            Ok(()) => {
                info!(user_id, books = data.books.len(), "Pushed reading snapshot.");
                self.check_badges(user_id).await;
            }
            Err(e) => {
                // Nothing is lost: local persistence already holds this
                // state, and the next change event re-triggers a push.
                error!(user_id, error = %e, "Failed to push reading snapshot.");
            }
        }
    }

    /// Diffs the currently unlocked badges against the user's notified set,
    /// emits one notification per newly unlocked badge (sequentially, in
    /// stable id order), then records the full unlocked set.
    async fn check_badges(&self, user_id: &str) {
        let unlocked = compute_unlocked_badges(&self.store.books());
        let already = self.store.notified_badges_for(user_id);
        let new: Vec<&str> = unlocked
            .iter()
            .copied()
            .filter(|id| !already.contains(*id))
            .collect();
        if new.is_empty() {
            return;
        }

        for &badge_id in &new {
            let label = badge_label(badge_id).unwrap_or(badge_id);
            let record = NotificationRecord {
                user_id: user_id.to_string(),
                notification_type: NOTIFICATION_BADGE_UNLOCKED.to_string(),
                source_user_id: None,
                data: serde_json::json!({ "badge_id": badge_id, "badge_label": label }),
            };
            match self.remote.insert_notification(record).await {
                Ok(()) => info!(user_id, badge = badge_id, "Badge unlocked; notification sent."),
                Err(e) => {
                    error!(user_id, badge = badge_id, error = %e, "Failed to insert badge notification.");
                }
            }
        }

        self.store
            .record_notified_badges(user_id, unlocked.iter().map(|s| s.to_string()).collect());
    }

    /// Best-effort shutdown flush: write a fallback copy of the pending
    /// payload to local storage, then attempt one final push. Called by the
    /// run loop on cancellation; hosts may also call it from their own
    /// lifecycle hooks.
    pub async fn flush(&self) {
        let session = self.session_snapshot();
        let Some(user_id) = session.user_id else {
            return;
        };
        if !session.has_loaded {
            return;
        }

        let (data, reader_name) = self.store.snapshot();
        let payload = serde_json::json!({
            "readingData": data,
            "readerName": reader_name,
        });
        match serde_json::to_string(&payload) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(&pending_save_key(&user_id), &raw) {
                    warn!(user_id = %user_id, error = %e, "Failed to write shutdown fallback payload.");
                }
            }
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to serialize shutdown fallback payload."),
        }

        if self.push_in_flight.swap(true, Ordering::AcqRel) {
            info!(user_id = %user_id, "Push already in flight during flush; fallback copy written.");
            return;
        }
        let result = self.remote.save_reading_data(&user_id, &data, &reader_name).await;
        self.push_in_flight.store(false, Ordering::Release);
        match result {
            Ok(()) => info!(user_id = %user_id, "Final snapshot pushed on shutdown."),
            Err(e) => error!(user_id = %user_id, error = %e, "Final shutdown push failed; fallback copy remains."),
        }
    }
}

/// Converts a fetched profile into hydratable state. Each of the four
/// collection fields is defaulted to empty independently, so partial
/// corruption never blocks loading the rest.
fn hydrate_payload(profile: Option<RemoteProfile>) -> (ReadingData, String) {
    let Some(profile) = profile else {
        return (ReadingData::default(), String::new());
    };
    let reader_name = profile.reader_name.unwrap_or_default();
    let Some(blob) = profile.reading_data else {
        return (ReadingData::default(), reader_name);
    };

    let data = ReadingData {
        books: collection(&blob, "books"),
        goals: collection(&blob, "goals"),
        daily_logs: collection(&blob, "dailyLogs"),
        threads: collection(&blob, "threads"),
    };
    (data, reader_name)
}

fn collection<T: DeserializeOwned>(blob: &JsonValue, key: &str) -> Vec<T> {
    match blob.get(key) {
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(key, error = %e, "Malformed collection in remote reading data; defaulting to empty.");
            Vec::new()
        }),
        None => Vec::new(),
    }
}
