//! Shared infrastructure: HTTP client, sanitizer, rate counter

pub mod http;
pub mod rate;
pub mod sanitizer;
