use super::state::SessionState;
use crate::error::{Result, ViroError};
use crate::generation::{GenerationBackend, validate_topic};
use crate::history::{HistoryEntry, HistoryLog, HistoryRepository, TopicGroup};
use crate::identity::{IdentityProvider, IdentitySubscription, UserIdentity};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const TIMEOUT_MESSAGE: &str = "La generación excedió el tiempo límite";

struct Inner {
    state: SessionState,
    /// Bumped on every identity transition. A generation started under an
    /// older epoch must not touch the state when it completes.
    epoch: u64,
}

/// Owns the session state of one page session.
///
/// `SessionController` is responsible for:
/// - Tracking the current identity and loading that user's history
/// - Running the generation flow against the backend
/// - Mutating and persisting the current user's history
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<RwLock<Inner>>,
    repository: Arc<dyn HistoryRepository>,
    backend: Arc<dyn GenerationBackend>,
    timeout: Option<Duration>,
}

impl SessionController {
    /// Creates a controller with an empty, signed-out session.
    pub fn new(
        repository: Arc<dyn HistoryRepository>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                state: SessionState::new(),
                epoch: 0,
            })),
            repository,
            backend,
            timeout: None,
        }
    }

    /// Bounds each backend call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Subscribes this controller to `provider`'s identity events.
    pub fn attach(&self, provider: &dyn IdentityProvider) -> IdentitySubscription {
        IdentitySubscription::new(provider.subscribe(), self.clone())
    }

    /// Returns a copy of the current session state.
    pub async fn snapshot(&self) -> SessionState {
        self.inner.read().await.state.clone()
    }

    pub async fn current_user(&self) -> Option<UserIdentity> {
        self.inner.read().await.state.current_user.clone()
    }

    /// Current history grouped by topic.
    pub async fn grouped_history(&self) -> Vec<TopicGroup> {
        self.inner.read().await.state.history.group_by_topic()
    }

    /// Applies an identity transition.
    ///
    /// A present user gets their history loaded with a single storage read.
    /// Switching to a different user also drops the previous user's result,
    /// topic and error. An absent user resets the whole session. Either way any generation in
    /// flight is orphaned.
    pub async fn on_identity_change(&self, user: Option<UserIdentity>) -> Result<()> {
        let Some(user) = user else {
            let mut inner = self.inner.write().await;
            inner.epoch += 1;
            inner.state = SessionState::new();
            tracing::debug!("signed out; session state reset");
            return Ok(());
        };

        // Held across the load so no save or remove can land between the
        // read and the install of the loaded log.
        let mut inner = self.inner.write().await;
        inner.epoch += 1;
        let loaded = self.repository.load(&user.uid).await;

        let switched = inner
            .state
            .current_user
            .as_ref()
            .is_none_or(|current| current.uid != user.uid);
        if switched {
            inner.state.last_result = None;
            inner.state.last_topic = None;
            inner.state.last_error = None;
        }
        inner.state.is_generating = false;
        inner.state.current_user = Some(user.clone());
        match loaded {
            Ok(entries) => {
                let history = HistoryLog::from(entries.unwrap_or_default());
                tracing::debug!(uid = %user.uid, entries = history.len(), "history loaded");
                inner.state.history = history;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(uid = %user.uid, "failed to load history: {e}");
                inner.state.history = HistoryLog::new();
                inner.state.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Runs one generation for `topic`.
    ///
    /// On success the text becomes the display result and, when a user is
    /// signed in, a new entry is persisted at the front of their history.
    /// On failure only `last_error` changes. A submission while another one
    /// is in flight is rejected with `ViroError::Busy`.
    pub async fn submit(&self, topic: &str) -> Result<String> {
        if let Err(e) = validate_topic(topic) {
            self.inner.write().await.state.last_error = Some(e.user_message());
            return Err(e);
        }

        let epoch = {
            let mut inner = self.inner.write().await;
            if inner.state.is_generating {
                return Err(ViroError::Busy);
            }
            inner.state.is_generating = true;
            inner.state.last_error = None;
            inner.state.last_result = None;
            inner.state.last_topic = Some(topic.to_string());
            inner.epoch
        };

        let outcome = self.call_backend(topic).await;

        let mut inner = self.inner.write().await;
        if inner.epoch != epoch {
            tracing::warn!(topic, "identity changed during generation; result discarded");
            return Err(ViroError::Superseded);
        }
        inner.state.is_generating = false;

        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(topic, "generation failed: {e}");
                inner.state.last_error = Some(e.user_message());
                return Err(e);
            }
        };
        inner.state.last_result = Some(text.clone());

        if let Some(user) = inner.state.current_user.clone() {
            let updated = inner
                .state
                .history
                .prepended(HistoryEntry::new(topic, text.clone()));
            if let Err(e) = self.repository.save(&user.uid, updated.entries()).await {
                inner.state.last_error = Some(e.user_message());
                return Err(e);
            }
            inner.state.history = updated;
        }

        tracing::info!(topic, chars = text.len(), "generation completed");
        Ok(text)
    }

    /// Removes the entry at `position` of the current history if its topic
    /// is `topic`, then persists the result. No-op when signed out.
    pub async fn delete_entry(&self, topic: &str, position: usize) -> Result<()> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.state.current_user.clone() else {
            return Ok(());
        };

        let updated = inner.state.history.without_entry(topic, position);
        if let Err(e) = self.repository.save(&user.uid, updated.entries()).await {
            inner.state.last_error = Some(e.user_message());
            return Err(e);
        }
        inner.state.history = updated;
        Ok(())
    }

    /// Empties the current history and removes its persisted record.
    pub async fn clear_all(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.state.current_user.clone() else {
            return Ok(());
        };

        if let Err(e) = self.repository.remove(&user.uid).await {
            inner.state.last_error = Some(e.user_message());
            return Err(e);
        }
        inner.state.history = HistoryLog::new();
        tracing::debug!(uid = %user.uid, "history cleared");
        Ok(())
    }

    /// Starts the provider's sign-in flow.
    ///
    /// The identity itself arrives through the subscription; this only
    /// reports failures.
    pub async fn sign_in(&self, provider: &dyn IdentityProvider) -> Result<UserIdentity> {
        match provider.sign_in().await {
            Ok(user) => Ok(user),
            Err(e) => {
                let e = match e {
                    ViroError::Auth(_) => e,
                    other => ViroError::auth(other.to_string()),
                };
                self.inner.write().await.state.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Signs out and clears the displayed result and topic.
    pub async fn sign_out(&self, provider: &dyn IdentityProvider) -> Result<()> {
        if let Err(e) = provider.sign_out().await {
            self.inner.write().await.state.last_error = Some(e.user_message());
            return Err(e);
        }
        let mut inner = self.inner.write().await;
        inner.state.last_result = None;
        inner.state.last_topic = None;
        Ok(())
    }

    async fn call_backend(&self, topic: &str) -> Result<String> {
        let request = self.backend.generate(topic);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| ViroError::generation(TIMEOUT_MESSAGE))?,
            None => request.await,
        }
    }
}
