//! Local identity provider.
//!
//! Stands in for a hosted sign-in flow: it signs in as whichever account
//! was configured and publishes transitions on a `watch` channel.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::watch;
use viro_core::error::{Result, ViroError};
use viro_core::identity::{IdentityProvider, UserIdentity};

pub struct LocalIdentityProvider {
    sender: watch::Sender<Option<UserIdentity>>,
    account: Mutex<Option<UserIdentity>>,
}

impl LocalIdentityProvider {
    /// Creates a signed-out provider that will sign in as `account`.
    pub fn new(account: Option<UserIdentity>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            account: Mutex::new(account),
        }
    }

    /// Replaces the account used by the next sign-in.
    pub fn set_account(&self, account: Option<UserIdentity>) {
        if let Ok(mut slot) = self.account.lock() {
            *slot = account;
        }
    }

    pub fn current(&self) -> Option<UserIdentity> {
        self.sender.borrow().clone()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.sender.subscribe()
    }

    async fn sign_in(&self) -> Result<UserIdentity> {
        let account = self
            .account
            .lock()
            .map_err(|e| ViroError::auth(format!("account slot poisoned: {e}")))?
            .clone();
        let user = account.ok_or_else(|| ViroError::auth("no hay ninguna cuenta configurada"))?;
        tracing::debug!(uid = %user.uid, "signed in");
        self.sender.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.sender.send_replace(None);
        Ok(())
    }
}
