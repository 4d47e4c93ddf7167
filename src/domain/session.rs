//! The authenticated user's own profile, as held by the client.

use serde::Serialize;
use serde_json::{Map, Value};
use taggr_api_types::{Karma, UserId, UserRecord};
use tracing::warn;

/// Order of the realm list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RealmOrder {
    /// As sent by the backend, oldest membership first.
    Server,
    /// Most recently joined first.
    Recency,
}

/// Per-user UI settings, serialized on the wire and parsed once held.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserSettings {
    Serialized(String),
    Parsed(Map<String, Value>),
}

impl UserSettings {
    fn parse(self, user: UserId) -> Self {
        match self {
            Self::Serialized(raw) if raw.trim().is_empty() => Self::Parsed(Map::new()),
            Self::Serialized(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(map) => Self::Parsed(map),
                Err(err) => {
                    warn!(user, error = %err, "discarding unparseable user settings");
                    Self::Parsed(Map::new())
                }
            },
            parsed @ Self::Parsed(_) => parsed,
        }
    }
}

/// Session view of the caller's profile.
///
/// Built from a [`UserRecord`] and then brought into display shape by
/// [`SessionUser::normalize`]. The order and settings markers make
/// normalization idempotent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub balance: u64,
    pub karma: Karma,
    realms: Vec<String>,
    realm_order: RealmOrder,
    settings: UserSettings,
    /// Nanoseconds since the Unix epoch, backend clock.
    pub last_activity: u64,
    pub extra: Map<String, Value>,
}

impl From<UserRecord> for SessionUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            balance: record.balance,
            karma: record.karma,
            realms: record.realms,
            realm_order: RealmOrder::Server,
            settings: UserSettings::Serialized(record.settings),
            last_activity: record.last_activity,
            extra: record.extra,
        }
    }
}

impl SessionUser {
    pub fn normalize(mut self) -> Self {
        if self.realm_order == RealmOrder::Server {
            self.realms.reverse();
            self.realm_order = RealmOrder::Recency;
        }
        self.settings = self.settings.parse(self.id);
        self
    }

    pub fn is_normalized(&self) -> bool {
        self.realm_order == RealmOrder::Recency && matches!(self.settings, UserSettings::Parsed(_))
    }

    pub fn realms(&self) -> &[String] {
        &self.realms
    }

    pub fn realm_order(&self) -> RealmOrder {
        self.realm_order
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Look up a parsed setting; `None` before normalization.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        match &self.settings {
            UserSettings::Parsed(map) => map.get(key),
            UserSettings::Serialized(_) => None,
        }
    }

    pub fn is_member_of(&self, realm: &str) -> bool {
        self.realms.iter().any(|joined| joined == realm)
    }
}
