pub mod stats;
pub mod store;

pub use store::SampleStore;

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Label identifying which scenario step produced a sample.
/// Several samples share a label; grouping happens at report time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// Pre-run GET /test against the backend server
    ServerStatusCheck,
    /// Pre-run GET /test through the proxy
    ProxyStatusCheck,
    /// First large-object fetch of the run (classified as a miss)
    LargeRequestNoCache,
    /// Any subsequent large-object fetch (classified as a hit)
    LargeRequestCached,
    /// POST /users against the backend
    CreateUser,
    /// GET /users through the proxy
    GetUsers,
    /// DELETE /users/{id} against the backend
    DeleteUser,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ServerStatusCheck => "server_status_check",
            Self::ProxyStatusCheck => "proxy_status_check",
            Self::LargeRequestNoCache => "large_request_nocache",
            Self::LargeRequestCached => "large_request_cached",
            Self::CreateUser => "create_user",
            Self::GetUsers => "get_users",
            Self::DeleteUser => "delete_user",
        }
    }

    /// The two large-object labels are reported separately from the rest
    /// (cache analysis vs. per-operation distribution).
    pub fn is_large_request(&self) -> bool {
        matches!(self, Self::LargeRequestNoCache | Self::LargeRequestCached)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single timing observation.
/// This is the "write" side — the connectivity check and the scenario
/// runner create these and push them into the [`SampleStore`].
#[derive(Debug, Clone)]
pub struct Sample {
    pub operation: Operation,
    /// Wall-clock time for the request, measured around the whole call
    pub response_time: Duration,
    /// `None` when the request failed before a response arrived
    pub status_code: Option<u16>,
    /// Instant the sample was recorded
    pub timestamp: DateTime<Utc>,
    /// true only for requests classified as served-from-cache
    pub cache_hit: bool,
}
