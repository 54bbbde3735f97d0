//! services/client/src/adapters/auth.rs
//!
//! Broadcast-channel implementation of the `AuthService` port. The host
//! application signs users in and out through this adapter; the bridge
//! consumes the resulting event stream. Subscribe (via `events`) before
//! emitting, or the event is dropped.

use readshelf_core::ports::{AuthEvent, AuthEventStream, AuthService};
use tokio::sync::broadcast;

pub struct ChannelAuthAdapter {
    tx: broadcast::Sender<AuthEvent>,
}

impl ChannelAuthAdapter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        let _ = self.tx.send(AuthEvent::SignedIn(user_id.into()));
    }

    pub fn sign_out(&self) {
        let _ = self.tx.send(AuthEvent::SignedOut);
    }
}

impl Default for ChannelAuthAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthService for ChannelAuthAdapter {
    fn events(&self) -> AuthEventStream {
        let rx = self.tx.subscribe();
        Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}
