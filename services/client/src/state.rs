//! services/client/src/state.rs
//!
//! Defines the application's shared state bundle.

use crate::config::Config;
use crate::store::ReadingStore;
use readshelf_core::ports::{AuthService, LocalStorageService, RemoteStoreService};
use std::sync::Arc;

/// The shared application state, created once at startup. The store is the
/// single in-process source of truth; the ports are the system's only
/// external collaborators.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReadingStore>,
    pub remote: Arc<dyn RemoteStoreService>,
    pub storage: Arc<dyn LocalStorageService>,
    pub auth: Arc<dyn AuthService>,
    pub config: Arc<Config>,
}
