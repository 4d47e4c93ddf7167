//! Session tracking for the authenticated caller.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use metrics::counter;
use serde_json::{Value, json};
use taggr_api_types::{UserRecord, endpoints};
use tracing::{debug, info, instrument};

use crate::cache::lock::{rw_read, rw_write};
use crate::domain::session::SessionUser;

use super::backend::{Backend, BackendError, query_as};
use super::clock::Clock;

const SOURCE: &str = "application::session";
const METRIC_ACTIVITY_PING_TOTAL: &str = "taggr_session_activity_ping_total";

/// `last_visit` value meaning "nothing is new since the last visit".
pub const NO_PREVIOUS_VISIT: u64 = u64::MAX;

#[derive(Debug, Default)]
struct SessionState {
    user: Option<Arc<SessionUser>>,
    /// Backend `last_activity` of the previous visit, captured when activity is reported.
    last_visit: Option<u64>,
    /// Local time of the last activity report issued by this client.
    reported_at: Option<u64>,
}

/// Result of one session refresh.
#[derive(Debug, Clone)]
pub struct SessionRefresh {
    pub user: Option<Arc<SessionUser>>,
    pub activity_reported: bool,
}

pub struct SessionTracker {
    backend: Arc<dyn Backend>,
    clock: Arc<dyn Clock>,
    activity_threshold: Duration,
    state: RwLock<SessionState>,
}

impl SessionTracker {
    pub fn new(
        backend: Arc<dyn Backend>,
        clock: Arc<dyn Clock>,
        activity_threshold: Duration,
    ) -> Self {
        Self {
            backend,
            clock,
            activity_threshold,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// The normalized session user, if authenticated.
    pub fn current(&self) -> Option<Arc<SessionUser>> {
        rw_read(&self.state, SOURCE, "current").user.clone()
    }

    /// Whether the last successful refresh found a session.
    pub fn is_authenticated(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_authenticated").user.is_some()
    }

    /// Backend `last_activity` of the previous visit, or [`NO_PREVIOUS_VISIT`].
    pub fn last_visit(&self) -> Option<u64> {
        rw_read(&self.state, SOURCE, "last_visit").last_visit
    }

    /// Fetch the caller's profile and normalize it.
    ///
    /// A failed fetch leaves the previous session untouched. A `null` reply
    /// means the caller is anonymous and clears it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<SessionRefresh, BackendError> {
        let record: Option<UserRecord> =
            query_as(self.backend.as_ref(), endpoints::USER, json!([])).await?;

        let Some(record) = record else {
            rw_write(&self.state, SOURCE, "clear").user = None;
            debug!("No authenticated user");
            return Ok(SessionRefresh {
                user: None,
                activity_reported: false,
            });
        };

        let user = Arc::new(SessionUser::from(record).normalize());
        let activity_reported = self.install(Arc::clone(&user));
        if activity_reported {
            self.report_activity(user.id);
        }

        Ok(SessionRefresh {
            user: Some(user),
            activity_reported,
        })
    }

    /// Store the user and decide whether activity must be reported.
    fn install(&self, user: Arc<SessionUser>) -> bool {
        let now = self.clock.now_nanos();
        let threshold = u64::try_from(self.activity_threshold.as_nanos()).unwrap_or(u64::MAX);

        let mut state = rw_write(&self.state, SOURCE, "install");
        let last_seen = user.last_activity.max(state.reported_at.unwrap_or_default());
        let idle = now.saturating_sub(last_seen);

        let report = idle > threshold;
        if report {
            state.last_visit = Some(user.last_activity);
            state.reported_at = Some(now);
        } else if state.last_visit.is_none() {
            state.last_visit = Some(NO_PREVIOUS_VISIT);
        }
        state.user = Some(user);
        report
    }

    fn report_activity(&self, user: u64) {
        counter!(METRIC_ACTIVITY_PING_TOTAL).increment(1);
        info!(user, "Reporting renewed activity");

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(err) = backend
                .call(endpoints::UPDATE_LAST_ACTIVITY, Value::Null)
                .await
            {
                debug!(user, error = %err, "Activity update failed; ignoring");
            }
        });
    }
}
