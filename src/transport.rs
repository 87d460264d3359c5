use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::error::TransportError;
use crate::proxy::ProxyTarget;
use crate::request::Request;
use crate::response::Response;
use crate::tls::TlsOptions;

/// Sink for transport-level wire traces, shared with every pooled connection.
pub type DebugSink = Arc<Mutex<dyn Write + Send>>;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle naming one pooled connection in counters and diagnostics.
/// Assigned from a process-wide counter at creation so identity never depends
/// on an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One transport connection. Implementations own the wire protocol; this
/// layer only drives the lifecycle and classifies the failures they report.
pub trait Connection {
    fn is_started(&self) -> bool;

    /// Performs the transport-level connect and, for secure endpoints, the
    /// TLS handshake.
    fn start(&mut self) -> Result<(), TransportError>;

    fn send(&mut self, request: &Request) -> Result<Response, TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;

    fn configure_tls(&mut self, _options: &TlsOptions) {}

    fn set_debug_sink(&mut self, _sink: DebugSink) {}

    fn set_timeouts(&mut self, _open: Option<Duration>, _read: Option<Duration>) {}
}

/// Factory for unstarted connections bound to a destination and, when
/// configured, a proxy.
pub trait Connector {
    type Conn: Connection;

    fn connect(&self, endpoint: &Endpoint, proxy: Option<&ProxyTarget>) -> Self::Conn;
}
