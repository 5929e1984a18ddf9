use crate::endpoint::ListenEndpoint;
use crate::logging::LogFormat;

/// Default bind address; listens on every IPv4 interface.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default TCP port the front-end connects to.
pub const DEFAULT_PORT: u16 = 12345;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned default host used where allocation is required (e.g. serde).
#[must_use]
pub fn default_host_string() -> String {
    DEFAULT_HOST.to_owned()
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Computes the default listen endpoint.
#[must_use]
pub fn default_listen_endpoint() -> ListenEndpoint {
    ListenEndpoint::tcp(DEFAULT_HOST, DEFAULT_PORT)
}
