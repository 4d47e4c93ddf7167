//! Reference cache refresh.
//!
//! Fetches every reference query concurrently and installs the result as one
//! snapshot. A single failing query fails the whole refresh and the store
//! keeps serving the previous snapshot.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use metrics::{counter, histogram};
use serde_json::{Value, json};
use taggr_api_types::{RealmRow, TagRow, UserRow, endpoints};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::cache::lock::mutex_lock;
use crate::cache::{ReferenceStore, UpgradeWatch};
use crate::domain::snapshot::{ReferenceReplies, ReferenceSnapshot};

use super::backend::{Backend, BackendError, query_as};
use super::events::{EventKind, EventQueue};

const SOURCE: &str = "application::refresh";
const METRIC_REFRESH_TOTAL: &str = "taggr_cache_refresh_total";
const METRIC_REFRESH_FAILED_TOTAL: &str = "taggr_cache_refresh_failed_total";
const METRIC_REFRESH_MS: &str = "taggr_cache_refresh_ms";

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("reference refresh failed: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub recent_tags: u32,
    pub upgrade_marker_field: String,
}

impl From<&crate::config::RefreshSettings> for RefreshConfig {
    fn from(settings: &crate::config::RefreshSettings) -> Self {
        Self {
            recent_tags: settings.recent_tags.get(),
            upgrade_marker_field: settings.upgrade_marker_field.clone(),
        }
    }
}

pub struct ReferenceRefresher {
    backend: Arc<dyn Backend>,
    store: Arc<ReferenceStore>,
    events: Arc<EventQueue>,
    config: RefreshConfig,
    upgrade: Mutex<UpgradeWatch>,
}

impl ReferenceRefresher {
    pub fn new(
        backend: Arc<dyn Backend>,
        store: Arc<ReferenceStore>,
        events: Arc<EventQueue>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            backend,
            store,
            events,
            config,
            upgrade: Mutex::new(UpgradeWatch::new()),
        }
    }

    pub fn store(&self) -> &Arc<ReferenceStore> {
        &self.store
    }

    /// Fetch a complete snapshot and install it.
    ///
    /// On failure nothing is installed and the error is returned to the caller.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<ReferenceSnapshot>, RefreshError> {
        let started_at = Instant::now();

        let replies = match self.fetch().await {
            Ok(replies) => replies,
            Err(err) => {
                counter!(METRIC_REFRESH_FAILED_TOTAL).increment(1);
                return Err(err.into());
            }
        };

        let snapshot = ReferenceSnapshot::from_replies(replies, OffsetDateTime::now_utc());
        let marker = snapshot.upgrade_marker(&self.config.upgrade_marker_field);
        self.store.replace(snapshot);

        if let Some(marker) = mutex_lock(&self.upgrade, SOURCE, "observe").observe(marker) {
            self.events.publish(EventKind::UpgradeAvailable { marker });
        }

        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        counter!(METRIC_REFRESH_TOTAL).increment(1);
        histogram!(METRIC_REFRESH_MS).record(elapsed_ms);

        let current = self.store.snapshot();
        info!(
            users = current.users.len(),
            realms = current.realms.len(),
            elapsed_ms,
            "Reference cache refreshed"
        );
        Ok(current)
    }

    /// Refresh for the periodic timer: failures are logged and published as a
    /// warning, and the stale snapshot stays in place.
    ///
    /// Returns true if a new snapshot was installed.
    pub async fn refresh_in_background(&self) -> bool {
        match self.refresh().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "Reference refresh failed; keeping stale snapshot");
                self.events.publish(EventKind::RefreshFailed {
                    warning: err.to_string(),
                });
                false
            }
        }
    }

    async fn fetch(&self) -> Result<ReferenceReplies, BackendError> {
        let backend = self.backend.as_ref();
        let (users, recent_tags, stats, config, realms) = tokio::try_join!(
            query_as::<Vec<UserRow>>(backend, endpoints::USERS, Value::Null),
            query_as::<Vec<TagRow>>(
                backend,
                endpoints::RECENT_TAGS,
                json!(self.config.recent_tags)
            ),
            query_as::<Value>(backend, endpoints::STATS, Value::Null),
            query_as::<Value>(backend, endpoints::CONFIG, Value::Null),
            query_as::<Vec<RealmRow>>(backend, endpoints::REALMS_DATA, Value::Null),
        )?;

        Ok(ReferenceReplies {
            users,
            recent_tags,
            stats,
            config,
            realms,
        })
    }
}
