//! Identity event delivery.
//!
//! An [`IdentitySubscription`] is the consuming end of a provider's
//! identity channel bound to one [`SessionController`]. It can be driven
//! manually (`poll`/`next`) or moved onto a task with `spawn`.

use super::model::UserIdentity;
use crate::error::Result;
use crate::session::SessionController;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct IdentitySubscription {
    receiver: watch::Receiver<Option<UserIdentity>>,
    controller: SessionController,
}

impl IdentitySubscription {
    /// Binds a receiver to a controller.
    ///
    /// The receiver's current value is treated as unseen so the first
    /// `poll` or `next` delivers it.
    pub(crate) fn new(
        mut receiver: watch::Receiver<Option<UserIdentity>>,
        controller: SessionController,
    ) -> Self {
        receiver.mark_changed();
        Self {
            receiver,
            controller,
        }
    }

    /// Applies the pending identity event, if there is one.
    ///
    /// Returns `Ok(true)` when an event was applied.
    pub async fn poll(&mut self) -> Result<bool> {
        match self.receiver.has_changed() {
            Ok(true) => {
                self.apply_current().await?;
                Ok(true)
            }
            // No pending change, or the provider is gone
            Ok(false) | Err(_) => Ok(false),
        }
    }

    /// Waits for the next identity event and applies it.
    ///
    /// Returns `Ok(false)` once the provider has dropped its sender.
    pub async fn next(&mut self) -> Result<bool> {
        if self.receiver.changed().await.is_err() {
            return Ok(false);
        }
        self.apply_current().await?;
        Ok(true)
    }

    /// Moves the subscription onto a background task.
    pub fn spawn(mut self) -> IdentityListener {
        let handle = tokio::spawn(async move {
            loop {
                match self.next().await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => tracing::warn!("identity change could not be applied: {e}"),
                }
            }
            tracing::debug!("identity provider closed; listener stopped");
        });
        IdentityListener {
            handle: Some(handle),
        }
    }

    async fn apply_current(&mut self) -> Result<()> {
        let identity = self.receiver.borrow_and_update().clone();
        self.controller.on_identity_change(identity).await
    }
}

/// Handle to a spawned identity listener.
///
/// Dropping the handle unsubscribes as well.
pub struct IdentityListener {
    handle: Option<JoinHandle<()>>,
}

impl IdentityListener {
    /// Stops delivering identity events.
    pub fn unsubscribe(mut self) {
        self.abort();
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for IdentityListener {
    fn drop(&mut self) {
        self.abort();
    }
}
