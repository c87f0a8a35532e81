//! Session state tracking.
//!
//! `SessionController` owns the authenticated/unauthenticated flag the
//! rest of the application reads. The flag lives in a watch channel so
//! reads are synchronous and collaborators can subscribe to transitions;
//! every credential mutation updates it in the same guarded section as
//! the store write.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::auth::store::CredentialStore;

/// Whether a credential pair is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Owned session flag with subscribe/notify. Invariant: the flag reads
/// `Authenticated` exactly when the credential store holds a pair.
#[derive(Debug)]
pub struct SessionController {
    tx: watch::Sender<SessionState>,
}

impl SessionController {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Derive the initial flag from the store, once, at startup. A store
    /// read failure degrades to `Unauthenticated` rather than blocking
    /// construction.
    pub fn from_store(store: &dyn CredentialStore) -> Self {
        let initial = match store.get() {
            Ok(Some(_)) => SessionState::Authenticated,
            Ok(None) => SessionState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "failed to read credential store, starting unauthenticated");
                SessionState::Unauthenticated
            }
        };
        debug!(?initial, "session state derived from store");
        Self::new(initial)
    }

    pub fn current(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current() == SessionState::Authenticated
    }

    /// Watch transitions without polling.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Transition the flag. Restricted to the credential mutation paths.
    pub(crate) fn set(&self, state: SessionState) {
        self.tx.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{MemoryCredentialStore, TokenPair};

    #[test]
    fn empty_store_derives_unauthenticated() {
        let store = MemoryCredentialStore::new();
        let controller = SessionController::from_store(&store);
        assert_eq!(controller.current(), SessionState::Unauthenticated);
        assert!(!controller.is_authenticated());
    }

    #[test]
    fn populated_store_derives_authenticated() {
        let store = MemoryCredentialStore::new();
        store
            .save(&TokenPair {
                access_token: "at".into(),
                refresh_token: "rt".into(),
            })
            .unwrap();

        let controller = SessionController::from_store(&store);
        assert!(controller.is_authenticated());
    }

    #[test]
    fn subscribers_observe_transitions() {
        let controller = SessionController::new(SessionState::Unauthenticated);
        let mut rx = controller.subscribe();

        assert!(!rx.has_changed().unwrap());
        controller.set(SessionState::Authenticated);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Authenticated);
    }
}
