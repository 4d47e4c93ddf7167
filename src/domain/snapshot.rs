//! Reference snapshot: the read-mostly view of server data shared by every page.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use taggr_api_types::{Karma, RealmRow, TagRow, UserId, UserRow};
use time::OffsetDateTime;

/// Display metadata of a realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealmSummary {
    pub color: String,
    /// Whether the authenticated caller controls the realm; `None` when anonymous.
    pub controller: Option<bool>,
}

/// Immutable snapshot of rarely-changing reference data.
///
/// A snapshot is built in one go from a complete set of query replies and is
/// never mutated afterwards; refreshing produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceSnapshot {
    pub users: BTreeMap<UserId, String>,
    pub karma: BTreeMap<UserId, Karma>,
    pub recent_tags: Vec<String>,
    pub realms: BTreeMap<String, RealmSummary>,
    pub stats: Value,
    pub config: Value,
    #[serde(with = "time::serde::rfc3339::option")]
    pub fetched_at: Option<OffsetDateTime>,
}

/// Raw replies of the reference queries, in the shapes the backend sends.
#[derive(Debug, Clone, Default)]
pub struct ReferenceReplies {
    pub users: Vec<UserRow>,
    pub recent_tags: Vec<TagRow>,
    pub stats: Value,
    pub config: Value,
    pub realms: Vec<RealmRow>,
}

impl ReferenceSnapshot {
    /// The placeholder held before the first successful refresh.
    pub fn empty() -> Self {
        Self {
            users: BTreeMap::new(),
            karma: BTreeMap::new(),
            recent_tags: Vec::new(),
            realms: BTreeMap::new(),
            stats: Value::Null,
            config: Value::Null,
            fetched_at: None,
        }
    }

    pub fn from_replies(replies: ReferenceReplies, fetched_at: OffsetDateTime) -> Self {
        let ReferenceReplies {
            users,
            recent_tags,
            stats,
            config,
            realms,
        } = replies;

        let mut names = BTreeMap::new();
        let mut karma = BTreeMap::new();
        for (id, name, user_karma) in users {
            names.insert(id, name);
            karma.insert(id, user_karma);
        }

        Self {
            users: names,
            karma,
            recent_tags: recent_tags.into_iter().map(|(tag, _)| tag).collect(),
            realms: realms
                .into_iter()
                .map(|(name, color, controller)| (name, RealmSummary { color, controller }))
                .collect(),
            stats,
            config,
            fetched_at: Some(fetched_at),
        }
    }

    /// Whether a refresh has ever installed this snapshot's data.
    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }

    /// Display name of user `id`.
    pub fn user_name(&self, id: UserId) -> Option<&str> {
        self.users.get(&id).map(String::as_str)
    }

    /// Resolve a display name back to its id, ignoring case.
    pub fn user_id(&self, name: &str) -> Option<UserId> {
        self.users
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    /// Karma of user `id`; zero for unknown users.
    pub fn karma_of(&self, id: UserId) -> Karma {
        self.karma.get(&id).copied().unwrap_or_default()
    }

    /// Display metadata of realm `name`.
    pub fn realm(&self, name: &str) -> Option<&RealmSummary> {
        self.realms.get(name)
    }

    /// Whether `tag` is among the recent tags, ignoring case.
    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.recent_tags
            .iter()
            .any(|known| known.eq_ignore_ascii_case(tag))
    }

    /// Read the release marker stored under `field` in the stats record.
    ///
    /// Strings are used verbatim; any other non-null value uses its JSON text.
    pub fn upgrade_marker(&self, field: &str) -> Option<String> {
        match self.stats.get(field)? {
            Value::Null => None,
            Value::String(marker) => Some(marker.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl Default for ReferenceSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
