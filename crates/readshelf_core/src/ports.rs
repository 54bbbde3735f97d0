//! crates/readshelf_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the reading tracker's core.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the hosted backend (remote profile table,
//! notification table), the durable key-value storage, and the auth provider.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value as JsonValue;
use std::pin::Pin;

use crate::domain::ReadingData;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Remote Store Port
//=========================================================================================

/// The per-user profile record as fetched from the remote store.
///
/// `reading_data` is kept as raw JSON: hydration tolerates partially
/// malformed payloads by defaulting each collection independently, so the
/// blob must not be forced through a strict decode at the port boundary.
#[derive(Debug, Clone)]
pub struct RemoteProfile {
    pub reading_data: Option<JsonValue>,
    pub reader_name: Option<String>,
}

/// A notification row to insert into the remote store.
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub user_id: String,
    pub notification_type: String,
    pub source_user_id: Option<String>,
    pub data: JsonValue,
}

/// Notification type tag used for badge unlocks.
pub const NOTIFICATION_BADGE_UNLOCKED: &str = "badge_unlocked";

#[async_trait]
pub trait RemoteStoreService: Send + Sync {
    /// Fetches the profile record for a user, or `None` if no record exists.
    async fn fetch_profile(&self, user_id: &str) -> PortResult<Option<RemoteProfile>>;

    /// Writes the full reading snapshot for a user. Full-record overwrite,
    /// last writer wins; there is no version check.
    async fn save_reading_data(
        &self,
        user_id: &str,
        data: &ReadingData,
        reader_name: &str,
    ) -> PortResult<()>;

    /// Inserts one notification record.
    async fn insert_notification(&self, record: NotificationRecord) -> PortResult<()>;
}

//=========================================================================================
// Local Storage Port
//=========================================================================================

/// Durable local key-value storage (offline-first persistence, shutdown
/// fallback). Operations are synchronous; callers treat failures as
/// log-and-continue.
pub trait LocalStorageService: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}

//=========================================================================================
// Auth Port
//=========================================================================================

/// A transition in the authentication session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A user signed in (or the active user switched to this id).
    SignedIn(String),
    /// The active user signed out.
    SignedOut,
}

/// A boxed stream of auth transitions.
pub type AuthEventStream = Pin<Box<dyn Stream<Item = AuthEvent> + Send>>;

/// The authentication collaborator. It supplies a stable user id and a
/// sign-in/sign-out event stream; authentication itself lives outside this
/// system.
pub trait AuthService: Send + Sync {
    fn events(&self) -> AuthEventStream;
}
