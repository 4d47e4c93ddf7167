//! Application shell: wires the reference cache, the session tracker and the
//! event queue behind one handle and owns the periodic refresh loop.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::ReferenceStore;
use crate::config::Settings;
use crate::domain::session::SessionUser;
use crate::domain::snapshot::ReferenceSnapshot;
use crate::router::{Renderer, Router, Transition};

use super::backend::Backend;
use super::clock::{Clock, SystemClock};
use super::error::ClientError;
use super::events::{EventKind, EventQueue};
use super::refresh::{ReferenceRefresher, RefreshConfig};
use super::session::SessionTracker;

pub struct Shell {
    backend: Arc<dyn Backend>,
    refresher: ReferenceRefresher,
    session: SessionTracker,
    events: Arc<EventQueue>,
    refresh_interval: Duration,
}

impl Shell {
    pub fn new(backend: Arc<dyn Backend>, settings: &Settings) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock), settings)
    }

    pub fn with_clock(
        backend: Arc<dyn Backend>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
    ) -> Self {
        let events = Arc::new(EventQueue::new());
        let refresher = ReferenceRefresher::new(
            Arc::clone(&backend),
            Arc::new(ReferenceStore::new()),
            Arc::clone(&events),
            RefreshConfig::from(&settings.refresh),
        );
        let session = SessionTracker::new(
            Arc::clone(&backend),
            clock,
            settings.session.activity_threshold,
        );

        Self {
            backend,
            refresher,
            session,
            events,
            refresh_interval: settings.refresh.interval,
        }
    }

    /// Initial load: the reference cache and the session are both fetched
    /// before the caller renders anything. Either failure is returned.
    pub async fn start(&self) -> Result<(), ClientError> {
        self.refresher.refresh().await?;
        let session = self.session.refresh().await?;
        info!(authenticated = session.user.is_some(), "Client shell started");
        Ok(())
    }

    /// Spawn the background timer refreshing cache and session every
    /// `refresh.interval`. The first tick is skipped since [`Shell::start`]
    /// already loaded both.
    pub fn spawn_refresh_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let shell = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(shell.refresh_interval);
            interval.tick().await; // Skip the first immediate tick
            loop {
                interval.tick().await;
                shell.tick().await;
            }
        })
    }

    /// One iteration of the refresh loop.
    pub async fn tick(&self) {
        self.refresher.refresh_in_background().await;
        if let Err(err) = self.session.refresh().await {
            warn!(error = %err, "Session refresh failed; keeping stale session");
        }
    }

    /// Issue a mutating call on behalf of the user.
    ///
    /// A failure is published as an alert and nothing changes locally. On
    /// success the session is refreshed so balances and realms follow.
    pub async fn mutate(&self, endpoint: &str, args: Value) -> Result<Value, ClientError> {
        match self.backend.call(endpoint, args).await {
            Ok(reply) => {
                if let Err(err) = self.session.refresh().await {
                    warn!(endpoint, error = %err, "Session refresh after call failed");
                }
                Ok(reply)
            }
            Err(err) => {
                let error = ClientError::from(err);
                self.events.publish(EventKind::Alert {
                    message: error.presentation_message(),
                });
                Err(error)
            }
        }
    }

    /// Navigate `router` to `hash` with the current session, following the
    /// root redirect the home route asks for.
    pub fn navigate<R: Renderer>(&self, router: &mut Router<R>, hash: &str) -> Transition {
        let session = self.session.current();
        match router.navigate(hash, session.as_deref()) {
            Transition::Reset { redirect_to } => {
                router.navigate(redirect_to, session.as_deref())
            }
            transition => transition,
        }
    }

    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        self.refresher.store().snapshot()
    }

    pub fn session(&self) -> Option<Arc<SessionUser>> {
        self.session.current()
    }

    pub fn last_visit(&self) -> Option<u64> {
        self.session.last_visit()
    }

    pub fn events(&self) -> &Arc<EventQueue> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use taggr_api_types::endpoints;

    use super::*;
    use crate::application::backend::BackendError;
    use crate::application::clock::ManualClock;
    use crate::router::RoutedView;

    const NOW: u64 = 1_800_000_000_000_000_000;

    struct StubBackend {
        call_reply: Mutex<Result<Value, BackendError>>,
        user_queries: AtomicUsize,
    }

    impl StubBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                call_reply: Mutex::new(Ok(json!(7))),
                user_queries: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn query(&self, endpoint: &str, _args: Value) -> Result<Value, BackendError> {
            Ok(match endpoint {
                endpoints::USERS => json!([[1, "alice", 10]]),
                endpoints::RECENT_TAGS => json!([["rust", 3]]),
                endpoints::STATS => json!({"last_upgrade": 1}),
                endpoints::CONFIG => json!({}),
                endpoints::REALMS_DATA => json!([]),
                endpoints::USER => {
                    self.user_queries.fetch_add(1, Ordering::SeqCst);
                    json!({"id": 1, "name": "alice", "last_activity": NOW})
                }
                other => panic!("unexpected query {other}"),
            })
        }

        async fn call(&self, _endpoint: &str, _args: Value) -> Result<Value, BackendError> {
            self.call_reply.lock().unwrap().clone()
        }
    }

    struct TitleRenderer;

    impl Renderer for TitleRenderer {
        type View = String;

        fn render(&mut self, route: &RoutedView) -> Self::View {
            route.title.clone()
        }
    }

    fn shell(backend: Arc<StubBackend>) -> Shell {
        Shell::with_clock(
            backend,
            Arc::new(ManualClock::at(NOW)),
            &Settings::default(),
        )
    }

    #[tokio::test]
    async fn start_loads_cache_and_session() {
        let shell = shell(StubBackend::new());
        shell.start().await.expect("start");

        assert_eq!(shell.snapshot().user_name(1), Some("alice"));
        assert_eq!(shell.session().map(|user| user.id), Some(1));
    }

    #[tokio::test]
    async fn rejected_mutation_alerts_and_keeps_state() {
        let backend = StubBackend::new();
        let shell = shell(Arc::clone(&backend));
        shell.start().await.expect("start");
        *backend.call_reply.lock().unwrap() =
            Err(BackendError::Rejected("not enough credits".into()));

        let error = shell
            .mutate("add_post", json!(["hi"]))
            .await
            .expect_err("rejected");

        assert!(matches!(
            error,
            ClientError::Rejected(ref message) if message == "not enough credits"
        ));
        assert_eq!(backend.user_queries.load(Ordering::SeqCst), 1);
        let events = shell.events().drain();
        assert_eq!(
            events.last().map(|event| &event.kind),
            Some(&EventKind::Alert {
                message: "not enough credits".into()
            })
        );
    }

    #[tokio::test]
    async fn successful_mutation_refreshes_session() {
        let backend = StubBackend::new();
        let shell = shell(Arc::clone(&backend));
        shell.start().await.expect("start");

        let reply = shell.mutate("add_post", json!(["hi"])).await.expect("ok");

        assert_eq!(reply, json!(7));
        assert_eq!(backend.user_queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn home_redirect_lands_on_root() {
        let shell = shell(StubBackend::new());
        shell.start().await.expect("start");
        let mut router = Router::new(TitleRenderer, Settings::default().router);

        shell.navigate(&mut router, "#/inbox");
        assert_eq!(router.title(), Some("Inbox"));

        assert_eq!(shell.navigate(&mut router, "#/home"), Transition::Rendered);
        assert_eq!(router.depth(), 1);
        assert_eq!(router.title(), Some("Home"));
    }
}
