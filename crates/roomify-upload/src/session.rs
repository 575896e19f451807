//! Session context consumed by the upload widget.
//!
//! Authentication itself happens elsewhere; the widget only needs the
//! "is signed in" flag and a way to be told when it changes.

use tokio::sync::watch;

/// Source of the signed-in flag
pub trait SessionProvider: Send + Sync {
    fn is_signed_in(&self) -> bool;

    /// Receiver notified whenever the flag changes
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// In-process session context backed by a watch channel.
#[derive(Debug)]
pub struct AuthContext {
    tx: watch::Sender<bool>,
}

impl AuthContext {
    pub fn new(signed_in: bool) -> Self {
        let (tx, _rx) = watch::channel(signed_in);
        Self { tx }
    }

    pub fn sign_in(&self) {
        self.set_signed_in(true);
    }

    pub fn sign_out(&self) {
        self.set_signed_in(false);
    }

    pub fn set_signed_in(&self, signed_in: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == signed_in {
                false
            } else {
                *current = signed_in;
                true
            }
        });
        if changed {
            tracing::debug!(signed_in, "Session state changed");
        }
    }
}

impl SessionProvider for AuthContext {
    fn is_signed_in(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
