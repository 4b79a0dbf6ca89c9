//! Shared helpers: filesystem operations and the HTTP fetcher.

pub mod fs;
pub mod http;
