//! Per-request observation hook
//!
//! The executor reports each completed call to a [`RequestObserver`] when
//! logging is enabled. Observers only see the call; they cannot change the
//! envelope handed back to the caller.

use crate::transport::HttpMethod;

/// Which executor path issued the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Json,
    Multipart,
    RawContent,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Json => "json",
            RequestKind::Multipart => "multipart",
            RequestKind::RawContent => "raw",
        }
    }
}

/// How the call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome<'a> {
    /// A response was received with this status
    Status(u16),
    /// No response; the transport's failure description
    Error(&'a str),
}

/// A completed request
#[derive(Debug, Clone, Copy)]
pub struct RequestEvent<'a> {
    pub kind: RequestKind,
    pub method: HttpMethod,
    pub url: &'a str,
    pub outcome: RequestOutcome<'a>,
}

/// Receives one event per executed request
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, event: &RequestEvent<'_>);
}

impl<F> RequestObserver for F
where
    F: Fn(&RequestEvent<'_>) + Send + Sync,
{
    fn on_request(&self, event: &RequestEvent<'_>) {
        self(event)
    }
}

/// Emits a `tracing` record per request
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent<'_>) {
        match event.outcome {
            RequestOutcome::Status(status) => tracing::info!(
                kind = event.kind.as_str(),
                method = %event.method,
                url = event.url,
                status,
                "S3 Connector API request"
            ),
            RequestOutcome::Error(error) => tracing::error!(
                kind = event.kind.as_str(),
                method = %event.method,
                url = event.url,
                error,
                "S3 Connector API error"
            ),
        }
    }
}
