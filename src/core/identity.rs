//! Current signed-in identity with change notification.
//!
//! Authentication itself happens elsewhere; this only records who is signed
//! in so the conversation store can follow along.

use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

pub struct IdentityStore {
    tx: watch::Sender<Option<UserIdentity>>,
}

impl IdentityStore {
    pub fn new(initial: Option<UserIdentity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.tx.subscribe()
    }

    /// Signing in as the identity that is already current does not notify.
    pub fn sign_in(&self, user: UserIdentity) {
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&user) {
                false
            } else {
                *current = Some(user);
                true
            }
        });
    }

    pub fn sign_out(&self) {
        self.tx.send_if_modified(|current| current.take().is_some());
    }
}
