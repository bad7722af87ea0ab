#[cfg(test)]
mod tests {
    use crate::error::{Result, ViroError};
    use crate::generation::GenerationBackend;
    use crate::history::{HistoryEntry, HistoryRepository, InMemoryHistoryRepository};
    use crate::identity::{IdentityProvider, UserIdentity};
    use crate::session::SessionController;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::{Notify, watch};

    // Mock backend replaying scripted responses
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate(&self, topic: &str) -> Result<String> {
            self.calls.lock().unwrap().push(topic.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ViroError::generation("no scripted response")))
        }
    }

    // Mock backend that blocks until released
    struct GatedBackend {
        started: Notify,
        release: Notify,
    }

    impl GatedBackend {
        fn new() -> Self {
            Self {
                started: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for GatedBackend {
        async fn generate(&self, topic: &str) -> Result<String> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(format!("ideas para {topic}"))
        }
    }

    struct PendingBackend;

    #[async_trait]
    impl GenerationBackend for PendingBackend {
        async fn generate(&self, _topic: &str) -> Result<String> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    // Mock identity provider backed by a watch channel
    struct MockProvider {
        sender: watch::Sender<Option<UserIdentity>>,
        account: Option<UserIdentity>,
    }

    impl MockProvider {
        fn new(account: Option<UserIdentity>) -> Self {
            let (sender, _) = watch::channel(None);
            Self { sender, account }
        }
    }

    #[async_trait]
    impl IdentityProvider for MockProvider {
        fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
            self.sender.subscribe()
        }

        async fn sign_in(&self) -> Result<UserIdentity> {
            let user = self
                .account
                .clone()
                .ok_or_else(|| ViroError::auth("popup closed by user"))?;
            self.sender.send_replace(Some(user.clone()));
            Ok(user)
        }

        async fn sign_out(&self) -> Result<()> {
            self.sender.send_replace(None);
            Ok(())
        }
    }

    // Mock repository whose next load pauses after reading until released
    struct GatedLoadRepository {
        records: InMemoryHistoryRepository,
        armed: AtomicBool,
        load_started: Notify,
        release_load: Notify,
    }

    impl GatedLoadRepository {
        fn new() -> Self {
            Self {
                records: InMemoryHistoryRepository::new(),
                armed: AtomicBool::new(false),
                load_started: Notify::new(),
                release_load: Notify::new(),
            }
        }

        fn arm(&self) {
            self.armed.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl HistoryRepository for GatedLoadRepository {
        async fn load(&self, user_id: &str) -> Result<Option<Vec<HistoryEntry>>> {
            let entries = self.records.load(user_id).await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.load_started.notify_one();
                self.release_load.notified().await;
            }
            Ok(entries)
        }

        async fn save(&self, user_id: &str, entries: &[HistoryEntry]) -> Result<()> {
            self.records.save(user_id, entries).await
        }

        async fn remove(&self, user_id: &str) -> Result<()> {
            self.records.remove(user_id).await
        }
    }

    fn u1() -> UserIdentity {
        UserIdentity::new("u1", "Ana")
    }

    fn u2() -> UserIdentity {
        UserIdentity::new("u2", "Luis")
    }

    fn controller_with(
        backend: Arc<dyn GenerationBackend>,
    ) -> (SessionController, Arc<InMemoryHistoryRepository>) {
        let repo = Arc::new(InMemoryHistoryRepository::new());
        (SessionController::new(repo.clone(), backend), repo)
    }

    #[tokio::test]
    async fn test_new_session_is_empty() {
        let (controller, _) = controller_with(Arc::new(ScriptedBackend::new(vec![])));
        let state = controller.snapshot().await;

        assert!(state.current_user.is_none());
        assert!(state.history.is_empty());
        assert!(!state.is_generating);
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn test_submit_appends_entry_for_signed_in_user() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("1. ... 2. ...".to_string()),
            Err(ViroError::generation("Error generando ideas")),
        ]));
        let (controller, repo) = controller_with(backend.clone());
        controller.on_identity_change(Some(u1())).await.unwrap();

        let text = controller.submit("reels de cocina").await.unwrap();
        assert_eq!(text, "1. ... 2. ...");

        let state = controller.snapshot().await;
        assert_eq!(state.history.len(), 1);
        let entry = &state.history.entries()[0];
        assert_eq!(entry.topic(), "reels de cocina");
        assert_eq!(entry.result(), "1. ... 2. ...");
        assert_eq!(state.last_result.as_deref(), Some("1. ... 2. ..."));

        let persisted = repo.load("u1").await.unwrap().unwrap();
        assert_eq!(persisted.len(), 1);

        // A failing second submission keeps the single-entry log
        let err = controller.submit("reels de cocina").await.unwrap_err();
        assert!(err.is_generation());

        let state = controller.snapshot().await;
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.last_error.as_deref(), Some("Error generando ideas"));
        assert!(!state.is_generating);
        assert_eq!(repo.load("u1").await.unwrap().unwrap().len(), 1);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_signed_out_stores_nothing() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("ideas".to_string())]));
        let (controller, repo) = controller_with(backend);

        controller.submit("gatos").await.unwrap();

        let state = controller.snapshot().await;
        assert!(state.history.is_empty());
        assert_eq!(state.last_result.as_deref(), Some("ideas"));
        assert!(!repo.contains("u1"));
    }

    #[tokio::test]
    async fn test_newest_entry_first() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("a".to_string()),
            Ok("b".to_string()),
        ]));
        let (controller, _) = controller_with(backend);
        controller.on_identity_change(Some(u1())).await.unwrap();

        controller.submit("primero").await.unwrap();
        controller.submit("segundo").await.unwrap();

        let state = controller.snapshot().await;
        let topics: Vec<&str> = state.history.entries().iter().map(|e| e.topic()).collect();
        assert_eq!(topics, vec!["segundo", "primero"]);
    }

    #[tokio::test]
    async fn test_empty_topic_never_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let (controller, _) = controller_with(backend.clone());

        let err = controller.submit("  ").await.unwrap_err();

        assert!(err.is_validation());
        assert!(backend.calls().is_empty());
        let state = controller.snapshot().await;
        assert_eq!(state.last_error.as_deref(), Some("Falta el tema"));
        assert!(!state.is_generating);
    }

    #[tokio::test]
    async fn test_submit_clears_previous_error() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(ViroError::generation("boom")),
            Ok("ok".to_string()),
        ]));
        let (controller, _) = controller_with(backend);

        let _ = controller.submit("x").await;
        assert_eq!(controller.snapshot().await.last_error.as_deref(), Some("boom"));

        controller.submit("x").await.unwrap();
        assert!(controller.snapshot().await.last_error.is_none());
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_rejected() {
        let backend = Arc::new(GatedBackend::new());
        let (controller, _) = controller_with(backend.clone());
        controller.on_identity_change(Some(u1())).await.unwrap();

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("gatos").await })
        };
        backend.started.notified().await;
        assert!(controller.snapshot().await.is_generating);

        let err = controller.submit("perros").await.unwrap_err();
        assert!(err.is_busy());

        backend.release.notify_one();
        let text = first.await.unwrap().unwrap();
        assert_eq!(text, "ideas para gatos");

        let state = controller.snapshot().await;
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.last_topic.as_deref(), Some("gatos"));
    }

    #[tokio::test]
    async fn test_identity_switch_during_generation_discards_result() {
        let backend = Arc::new(GatedBackend::new());
        let (controller, repo) = controller_with(backend.clone());
        controller.on_identity_change(Some(u1())).await.unwrap();

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("gatos").await })
        };
        backend.started.notified().await;

        controller.on_identity_change(Some(u2())).await.unwrap();
        backend.release.notify_one();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, ViroError::Superseded));

        let state = controller.snapshot().await;
        assert_eq!(state.current_user, Some(u2()));
        assert!(state.history.is_empty());
        assert!(state.last_result.is_none());
        assert!(!repo.contains("u1"));
        assert!(!repo.contains("u2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_timeout_is_a_generation_error() {
        let (controller, _) = controller_with(Arc::new(PendingBackend));
        let controller = controller.with_timeout(Duration::from_secs(5));

        let err = controller.submit("gatos").await.unwrap_err();

        assert!(err.is_generation());
        let state = controller.snapshot().await;
        assert!(!state.is_generating);
        assert_eq!(
            state.last_error.as_deref(),
            Some("La generación excedió el tiempo límite")
        );
    }

    #[tokio::test]
    async fn test_user_switch_restores_each_users_log() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("para ana".to_string()),
            Ok("para luis".to_string()),
        ]));
        let (controller, _) = controller_with(backend);

        controller.on_identity_change(Some(u1())).await.unwrap();
        controller.submit("cocina").await.unwrap();
        let a_log = controller.snapshot().await.history;

        controller.on_identity_change(Some(u2())).await.unwrap();
        assert!(controller.snapshot().await.history.is_empty());
        controller.submit("viajes").await.unwrap();

        controller.on_identity_change(Some(u1())).await.unwrap();
        assert_eq!(controller.snapshot().await.history, a_log);

        controller.on_identity_change(Some(u2())).await.unwrap();
        let b_log = controller.snapshot().await.history;
        assert_eq!(b_log.len(), 1);
        assert_eq!(b_log.entries()[0].result(), "para luis");
    }

    #[tokio::test]
    async fn test_one_read_per_identity_transition() {
        let (controller, repo) = controller_with(Arc::new(ScriptedBackend::new(vec![])));

        controller.on_identity_change(Some(u1())).await.unwrap();
        controller.on_identity_change(None).await.unwrap();
        controller.on_identity_change(Some(u2())).await.unwrap();

        assert_eq!(repo.read_count(), 2);
    }

    #[tokio::test]
    async fn test_sign_out_resets_transient_state() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("ideas".to_string())]));
        let (controller, _) = controller_with(backend);
        controller.on_identity_change(Some(u1())).await.unwrap();
        controller.submit("gatos").await.unwrap();

        controller.on_identity_change(None).await.unwrap();

        let state = controller.snapshot().await;
        assert!(state.current_user.is_none());
        assert!(state.history.is_empty());
        assert!(state.last_result.is_none());
        assert!(state.last_error.is_none());
        assert!(!state.is_generating);
    }

    #[tokio::test]
    async fn test_delete_entry_persists() {
        let (controller, repo) = controller_with(Arc::new(ScriptedBackend::new(vec![])));
        repo.save(
            "u1",
            &[
                HistoryEntry::new("gatos", "g2"),
                HistoryEntry::new("perros", "p1"),
                HistoryEntry::new("gatos", "g1"),
            ],
        )
        .await
        .unwrap();
        controller.on_identity_change(Some(u1())).await.unwrap();

        controller.delete_entry("gatos", 2).await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.history.len(), 2);
        let persisted = repo.load("u1").await.unwrap().unwrap();
        assert_eq!(persisted, state.history.entries().to_vec());

        // Mismatched coordinates leave the log alone
        controller.delete_entry("gatos", 1).await.unwrap();
        assert_eq!(controller.snapshot().await.history.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_all_removes_record() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("ideas".to_string())]));
        let (controller, repo) = controller_with(backend);
        controller.on_identity_change(Some(u1())).await.unwrap();
        controller.submit("gatos").await.unwrap();

        controller.clear_all().await.unwrap();

        assert!(!repo.contains("u1"));
        controller.on_identity_change(Some(u1())).await.unwrap();
        assert!(controller.snapshot().await.history.is_empty());
    }

    #[tokio::test]
    async fn test_history_operations_signed_out_are_noops() {
        let (controller, repo) = controller_with(Arc::new(ScriptedBackend::new(vec![])));

        controller.delete_entry("gatos", 0).await.unwrap();
        controller.clear_all().await.unwrap();

        assert!(!repo.contains("u1"));
        assert!(controller.grouped_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_failure_sets_error() {
        let (controller, _) = controller_with(Arc::new(ScriptedBackend::new(vec![])));
        let provider = MockProvider::new(None);

        let err = controller.sign_in(&provider).await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(
            controller.snapshot().await.last_error.as_deref(),
            Some("Error al iniciar sesión: popup closed by user")
        );
    }

    #[tokio::test]
    async fn test_subscription_delivers_initial_and_subsequent_events() {
        let (controller, repo) = controller_with(Arc::new(ScriptedBackend::new(vec![])));
        repo.save("u1", &[HistoryEntry::new("gatos", "g1")]).await.unwrap();
        let provider = MockProvider::new(Some(u1()));

        let mut subscription = controller.attach(&provider);
        // Initial delivery (signed out)
        assert!(subscription.poll().await.unwrap());
        assert!(!subscription.poll().await.unwrap());

        controller.sign_in(&provider).await.unwrap();
        assert!(subscription.poll().await.unwrap());
        let state = controller.snapshot().await;
        assert_eq!(state.current_user, Some(u1()));
        assert_eq!(state.history.len(), 1);

        controller.sign_out(&provider).await.unwrap();
        assert!(subscription.next().await.unwrap());
        assert!(controller.snapshot().await.current_user.is_none());
    }

    #[tokio::test]
    async fn test_spawned_listener_can_unsubscribe() {
        let (controller, _) = controller_with(Arc::new(ScriptedBackend::new(vec![])));
        let provider = MockProvider::new(Some(u1()));

        let listener = controller.attach(&provider).spawn();
        tokio::task::yield_now().await;
        assert!(listener.is_active());

        listener.unsubscribe();
        provider.sign_in().await.unwrap();
        tokio::task::yield_now().await;

        assert!(controller.snapshot().await.current_user.is_none());
    }

    #[tokio::test]
    async fn test_redelivery_overlapping_submit_keeps_memory_and_storage_in_sync() {
        let backend = Arc::new(GatedBackend::new());
        let repo = Arc::new(GatedLoadRepository::new());
        let controller = SessionController::new(repo.clone(), backend.clone());
        controller.on_identity_change(Some(u1())).await.unwrap();

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("x").await })
        };
        backend.started.notified().await;

        repo.arm();
        let redelivery = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.on_identity_change(Some(u1())).await })
        };
        repo.load_started.notified().await;

        backend.release.notify_one();
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        repo.release_load.notify_one();
        redelivery.await.unwrap().unwrap();

        let err = first.await.unwrap().unwrap_err();
        assert!(matches!(err, ViroError::Superseded));
        let persisted = repo.load("u1").await.unwrap().unwrap_or_default();
        assert_eq!(controller.snapshot().await.history.entries(), persisted.as_slice());

        let second = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("y").await })
        };
        backend.started.notified().await;
        backend.release.notify_one();
        second.await.unwrap().unwrap();

        let persisted = repo.load("u1").await.unwrap().unwrap_or_default();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].topic(), "y");
        assert_eq!(controller.snapshot().await.history.entries(), persisted.as_slice());
    }

    #[tokio::test]
    async fn test_switching_user_clears_previous_users_result() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("para ana".to_string())]));
        let (controller, _) = controller_with(backend);
        controller.on_identity_change(Some(u1())).await.unwrap();
        controller.submit("cocina").await.unwrap();
        let _ = controller.submit("   ").await;

        controller.on_identity_change(Some(u2())).await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.current_user, Some(u2()));
        assert!(state.last_result.is_none());
        assert!(state.last_topic.is_none());
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn test_redelivering_same_user_keeps_result() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("para ana".to_string())]));
        let (controller, _) = controller_with(backend);
        controller.on_identity_change(Some(u1())).await.unwrap();
        controller.submit("cocina").await.unwrap();

        controller.on_identity_change(Some(u1())).await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.last_result.as_deref(), Some("para ana"));
        assert_eq!(state.last_topic.as_deref(), Some("cocina"));
        assert_eq!(state.history.len(), 1);
    }
}
