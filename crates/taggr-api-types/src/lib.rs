//! Shared request and response shapes for the Taggr query/call API.
//!
//! Rows returned by list queries are positional tuples on the wire; the
//! aliases below name their components.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type UserId = u64;
pub type PostId = u64;
pub type Karma = i64;

/// `users` row: `(id, name, karma)`.
pub type UserRow = (UserId, String, Karma);

/// `recent_tags` row: `(tag, occurrences)`.
pub type TagRow = (String, u64);

/// `realms_data` row: `(name, label_color, caller_is_controller)`.
///
/// The last component is `None` for anonymous callers.
pub type RealmRow = (String, String, Option<bool>);

/// Reply envelope of every state-mutating call: `{"Ok": ..}` or `{"Err": ".."}`.
pub type CallReply<T> = Result<T, String>;

/// Endpoint names understood by the backend.
pub mod endpoints {
    pub const USERS: &str = "users";
    pub const RECENT_TAGS: &str = "recent_tags";
    pub const STATS: &str = "stats";
    pub const CONFIG: &str = "config";
    pub const REALMS_DATA: &str = "realms_data";
    pub const USER: &str = "user";
    pub const UPDATE_LAST_ACTIVITY: &str = "update_last_activity";
}

/// The authenticated caller's own profile as returned by `user` with no handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub karma: Karma,
    #[serde(default)]
    pub realms: Vec<String>,
    /// Serialized JSON object holding per-user UI settings.
    #[serde(default)]
    pub settings: String,
    /// Nanoseconds since the Unix epoch, backend clock.
    #[serde(default)]
    pub last_activity: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
