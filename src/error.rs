use http::Method;
use thiserror::Error;

use crate::transport::ConnectionId;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransportErrorKind {
    Refused,
    HostDown,
    BadResponse,
    Interrupted,
    Other,
}

impl TransportErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Refused => "refused",
            Self::HostDown => "host_down",
            Self::BadResponse => "bad_response",
            Self::Interrupted => "interrupted",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Failure reported by a [`Connection`](crate::Connection) implementation.
///
/// `Display` renders only the underlying description so the text can be
/// embedded in "due to ..." diagnostics without repeating the kind.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct TransportError {
    kind: TransportErrorKind,
    #[source]
    source: BoxError,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn bad_response(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::BadResponse, message.into())
    }

    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Interrupted, message.into())
    }

    pub fn from_io(source: std::io::Error) -> Self {
        let kind = match source.kind() {
            std::io::ErrorKind::ConnectionRefused => TransportErrorKind::Refused,
            std::io::ErrorKind::HostUnreachable | std::io::ErrorKind::NetworkUnreachable => {
                TransportErrorKind::HostDown
            }
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::WouldBlock => TransportErrorKind::Interrupted,
            _ => TransportErrorKind::Other,
        };
        Self::new(kind, source)
    }

    pub const fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("connection refused: {host}:{port}")]
    ConnectionRefused {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },
    #[error("host down: {host}:{port}")]
    HostDown {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },
    #[error("failed to start connection to {host}:{port}: {source}")]
    Start {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },
    #[error("too many bad responses after {requests} requests on connection {connection}")]
    TooManyBadResponses { requests: u64, connection: ConnectionId },
    #[error(
        "too many connection resets (due to {cause}) after {requests} requests on connection {connection}"
    )]
    TooManyResets {
        cause: String,
        requests: u64,
        connection: ConnectionId,
        #[source]
        source: TransportError,
    },
    #[error("transport error ({kind}) for {method} {target}: {source}")]
    Transport {
        kind: TransportErrorKind,
        method: Method,
        target: String,
        #[source]
        source: TransportError,
    },
    #[error("invalid proxy url {url}: {message}")]
    InvalidProxy { url: String, message: String },
    #[error("request target has no host: {uri}")]
    MissingHost { uri: String },
    #[error("invalid header name {name}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
    #[error("invalid header value for {name}: {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
}
