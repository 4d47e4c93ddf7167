//! Reference cache
//!
//! Holds the process-wide snapshot of rarely-changing server data (user
//! directory, karma, recent tags, realm metadata, stats, config):
//!
//! - **Store**: current snapshot behind an `Arc`, swapped whole on refresh
//! - **Upgrade watch**: detects a new backend release between refreshes
//!
//! Refresh cadence is controlled via `taggr-client.toml`:
//!
//! ```toml
//! [refresh]
//! interval_seconds = 600
//! recent_tags = 500
//! upgrade_marker_field = "last_upgrade"
//! ```

pub(crate) mod lock;
mod store;
mod upgrade;

pub use store::ReferenceStore;
pub use upgrade::UpgradeWatch;
