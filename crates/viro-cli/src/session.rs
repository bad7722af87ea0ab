//! Wiring of one CLI session: storage, endpoint client, identity provider
//! and the controller that ties them together.

use anyhow::Result;
use std::sync::Arc;
use viro_core::config::ViroConfig;
use viro_core::error::Result as ViroResult;
use viro_core::history::HistoryRepository;
use viro_core::identity::{IdentitySubscription, UserIdentity};
use viro_core::session::SessionController;
use viro_infrastructure::{JsonHistoryRepository, LocalIdentityProvider};
use viro_interaction::GenerateEndpointClient;

pub struct CliSession {
    pub controller: SessionController,
    provider: Arc<LocalIdentityProvider>,
    subscription: IdentitySubscription,
}

impl CliSession {
    /// Builds the session and applies the provider's initial (signed-out)
    /// identity.
    pub async fn open(config: &ViroConfig, account: Option<UserIdentity>) -> Result<Self> {
        let repository: Arc<dyn HistoryRepository> = match &config.storage.history_dir {
            Some(dir) => Arc::new(JsonHistoryRepository::with_root(dir)),
            None => Arc::new(JsonHistoryRepository::new()?),
        };
        let backend = GenerateEndpointClient::from_settings(&config.client)?;
        let controller = SessionController::new(repository, Arc::new(backend))
            .with_timeout(config.client.timeout());

        Self::with_controller(controller, account).await
    }

    pub async fn with_controller(
        controller: SessionController,
        account: Option<UserIdentity>,
    ) -> Result<Self> {
        let provider = Arc::new(LocalIdentityProvider::new(account));
        let mut subscription = controller.attach(provider.as_ref());
        subscription.poll().await?;
        Ok(Self {
            controller,
            provider,
            subscription,
        })
    }

    /// Signs in with the configured account, if any.
    pub async fn login(&mut self) -> ViroResult<UserIdentity> {
        let user = self.controller.sign_in(self.provider.as_ref()).await?;
        self.subscription.poll().await?;
        Ok(user)
    }

    /// Switches the account used by the next `login`.
    pub fn set_account(&self, account: UserIdentity) {
        self.provider.set_account(Some(account));
    }

    pub async fn logout(&mut self) -> ViroResult<()> {
        self.controller.sign_out(self.provider.as_ref()).await?;
        self.subscription.poll().await?;
        Ok(())
    }

    pub async fn is_signed_in(&self) -> bool {
        self.controller.current_user().await.is_some()
    }
}
