//! `reconn` keeps one live, reusable connection per (host, port, proxy)
//! destination per execution context, and recovers from transient
//! connection failures by retrying a request once per failure class.
//!
//! The wire protocol stays outside: callers plug in a [`Connector`] whose
//! connections speak HTTP (or anything request/response shaped), and this
//! crate drives their lifecycle: lazy open, keep-alive header injection,
//! stale-connection reset, bounded inline retry, and explicit shutdown.
//!
//! # Quick Start
//!
//! ```no_run
//! use http::Uri;
//! use reconn::prelude::*;
//!
//! # use reconn::{Endpoint, ProxyTarget, Request, Response, TransportError};
//! # struct StubConnection;
//! # impl Connection for StubConnection {
//! #     fn is_started(&self) -> bool { true }
//! #     fn start(&mut self) -> Result<(), TransportError> { Ok(()) }
//! #     fn send(&mut self, _request: &Request) -> Result<Response, TransportError> {
//! #         Ok(Response::new(http::StatusCode::OK, http::HeaderMap::new(), bytes::Bytes::new()))
//! #     }
//! #     fn close(&mut self) -> Result<(), TransportError> { Ok(()) }
//! # }
//! # struct StubConnector;
//! # impl Connector for StubConnector {
//! #     type Conn = StubConnection;
//! #     fn connect(&self, _endpoint: &Endpoint, _proxy: Option<&ProxyTarget>) -> StubConnection {
//! #         StubConnection
//! #     }
//! # }
//! fn main() -> Result<(), reconn::Error> {
//!     let client = ClientBuilder::new()
//!         .name("my-sdk")
//!         .proxy_from_env()
//!         .try_build(StubConnector)?;
//!
//!     // One session per thread of work; connections are never shared.
//!     let mut session = client.session();
//!     let uri: Uri = "http://api.example.com/v1/items".parse().expect("valid uri");
//!     let response = session.execute(&uri, None)?;
//!     println!("status={}", response.status());
//!     session.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Recommended Defaults
//!
//! - Build one [`Client`] per process and clone it into each worker.
//! - Call [`Session::shutdown`] when a context finishes; no finalizer or
//!   idle timeout closes connections for you.

mod client;
mod endpoint;
mod error;
mod proxy;
mod request;
mod response;
mod session;
mod tls;
mod transport;
mod util;

pub use crate::client::{Client, ClientBuilder};
pub use crate::endpoint::{ConnectionKey, Endpoint};
pub use crate::error::{Error, TransportError, TransportErrorKind};
pub use crate::proxy::ProxyTarget;
pub use crate::request::Request;
pub use crate::response::Response;
pub use crate::session::Session;
pub use crate::tls::{TlsOptions, VerifyCallback, VerifyMode};
pub use crate::transport::{Connection, ConnectionId, Connector, DebugSink};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        Client, ClientBuilder, Connection, ConnectionId, Connector, Error, Response, Session,
        TlsOptions, TransportErrorKind, VerifyMode,
    };
}
