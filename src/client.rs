use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

use crate::proxy::ProxyTarget;
use crate::session::Session;
use crate::tls::TlsOptions;
use crate::transport::{Connector, DebugSink};
use crate::util::{parse_header_name, parse_header_value};

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);
const DEFAULT_CLIENT_NAME: &str = "reconn";

enum ProxySource {
    Disabled,
    Environment,
    Explicit(ProxyTarget),
}

pub struct ClientBuilder {
    name: String,
    default_headers: HeaderMap,
    override_headers: HeaderMap,
    keep_alive: Duration,
    proxy: ProxySource,
    tls: TlsOptions,
    debug_sink: Option<DebugSink>,
    open_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_CLIENT_NAME.to_owned(),
            default_headers: HeaderMap::new(),
            override_headers: HeaderMap::new(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            proxy: ProxySource::Disabled,
            tls: TlsOptions::default(),
            debug_sink: None,
            open_timeout: None,
            read_timeout: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a header applied to every request with append semantics, so
    /// values the caller already set survive.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.append(name, value);
        self
    }

    pub fn try_default_header(self, name: &str, value: &str) -> crate::Result<Self> {
        let name = parse_header_name(name)?;
        let value = parse_header_value(name.as_str(), value)?;
        Ok(self.default_header(name, value))
    }

    /// Adds a header forced onto every request after the merge, replacing
    /// whatever the caller set under the same name.
    pub fn override_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.override_headers.insert(name, value);
        self
    }

    pub fn try_override_header(self, name: &str, value: &str) -> crate::Result<Self> {
        let name = parse_header_name(name)?;
        let value = parse_header_value(name.as_str(), value)?;
        Ok(self.override_header(name, value))
    }

    /// Interval advertised in the `Keep-Alive` request header.
    pub fn keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }

    pub fn proxy(mut self, proxy: ProxyTarget) -> Self {
        self.proxy = ProxySource::Explicit(proxy);
        self
    }

    /// Resolves the proxy from `http_proxy`/`HTTP_PROXY` once, at build time.
    pub fn proxy_from_env(mut self) -> Self {
        self.proxy = ProxySource::Environment;
        self
    }

    pub fn tls(mut self, options: TlsOptions) -> Self {
        self.tls = options;
        self
    }

    pub fn debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn try_build<C: Connector>(self, connector: C) -> crate::Result<Client<C>> {
        let proxy = match self.proxy {
            ProxySource::Disabled => None,
            ProxySource::Environment => ProxyTarget::from_env()?,
            ProxySource::Explicit(proxy) => Some(proxy),
        };
        Ok(Client {
            inner: Arc::new(Shared {
                connector,
                name: self.name,
                default_headers: self.default_headers,
                override_headers: self.override_headers,
                keep_alive: self.keep_alive,
                proxy,
                tls: self.tls,
                debug_sink: self.debug_sink,
                open_timeout: self.open_timeout,
                read_timeout: self.read_timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Shared<C> {
    pub(crate) connector: C,
    pub(crate) name: String,
    pub(crate) default_headers: HeaderMap,
    pub(crate) override_headers: HeaderMap,
    pub(crate) keep_alive: Duration,
    pub(crate) proxy: Option<ProxyTarget>,
    pub(crate) tls: TlsOptions,
    pub(crate) debug_sink: Option<DebugSink>,
    pub(crate) open_timeout: Option<Duration>,
    pub(crate) read_timeout: Option<Duration>,
}

/// Shared, immutable client configuration. Cheap to clone and safe to hand
/// to any number of threads; the connections themselves live in per-context
/// [`Session`]s minted by [`session`](Client::session).
pub struct Client<C> {
    inner: Arc<Shared<C>>,
}

impl<C: Connector> Client<C> {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates the connection state for one execution context. Every thread
    /// of work gets its own session and is responsible for calling
    /// [`shutdown`](Session::shutdown) on it.
    pub fn session(&self) -> Session<C> {
        Session::new(Arc::clone(&self.inner))
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn keep_alive(&self) -> Duration {
        self.inner.keep_alive
    }

    pub fn proxy(&self) -> Option<&ProxyTarget> {
        self.inner.proxy.as_ref()
    }

    pub fn tls(&self) -> &TlsOptions {
        &self.inner.tls
    }
}

impl<C> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClientBuilder;
    use crate::endpoint::Endpoint;
    use crate::error::TransportError;
    use crate::proxy::ProxyTarget;
    use crate::request::Request;
    use crate::response::Response;
    use crate::transport::{Connection, Connector};
    use std::time::Duration;

    struct NoopConnection;

    impl Connection for NoopConnection {
        fn is_started(&self) -> bool {
            true
        }

        fn start(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn send(&mut self, _request: &Request) -> Result<Response, TransportError> {
            Ok(Response::new(
                http::StatusCode::OK,
                http::HeaderMap::new(),
                bytes::Bytes::new(),
            ))
        }

        fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    struct NoopConnector;

    impl Connector for NoopConnector {
        type Conn = NoopConnection;

        fn connect(&self, _endpoint: &Endpoint, _proxy: Option<&ProxyTarget>) -> NoopConnection {
            NoopConnection
        }
    }

    #[test]
    fn builder_applies_defaults() {
        let client = ClientBuilder::new()
            .try_build(NoopConnector)
            .expect("build client");
        assert_eq!(client.name(), "reconn");
        assert_eq!(client.keep_alive(), Duration::from_secs(30));
        assert!(client.proxy().is_none());
    }

    #[test]
    fn explicit_proxy_is_kept() {
        let client = ClientBuilder::new()
            .proxy(ProxyTarget::new("proxy.internal", 3128))
            .try_build(NoopConnector)
            .expect("build client");
        assert_eq!(client.proxy().map(ProxyTarget::host), Some("proxy.internal"));
    }
}
