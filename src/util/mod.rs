//! Shared utilities

pub mod net;
pub mod rate_limit;
pub mod time;
