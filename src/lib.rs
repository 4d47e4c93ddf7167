//! Headless client core for Taggr-style social backends.
//!
//! Holds the reference cache and the caller's session, formats values for
//! display, and routes URL fragments to views over a frame stack.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod router;
pub mod util;
