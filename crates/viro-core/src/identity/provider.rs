//! Identity provider trait.

use super::model::UserIdentity;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// A third-party identity provider.
///
/// The provider pushes the current identity (or `None` when signed out)
/// through a `watch` channel. A fresh receiver always observes the current
/// value, which gives subscribers the initial delivery on subscribe.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns a receiver for identity transitions.
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;

    /// Starts the sign-in flow. Fails with `ViroError::Auth`.
    async fn sign_in(&self) -> Result<UserIdentity>;

    /// Signs the current user out.
    async fn sign_out(&self) -> Result<()>;
}
