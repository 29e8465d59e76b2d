//! Constants for the download module (timeouts, naming).

/// Default HTTP connect timeout (30 seconds). There is no total request timeout.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Prefix of generated names for URLs without a usable last path segment.
pub const GENERATED_NAME_PREFIX: &str = "download";
