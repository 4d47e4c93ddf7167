//! Display formatters shared by views.

pub mod amounts;
pub mod timeago;
