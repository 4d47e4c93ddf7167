//! Application services: backend boundary, cache and session refresh, shell.

pub mod backend;
pub mod clock;
pub mod error;
pub mod events;
pub mod refresh;
pub mod session;
pub mod shell;
