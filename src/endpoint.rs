use http::Uri;

use crate::error::Error;
use crate::proxy::ProxyTarget;

/// Destination of a pooled connection, normalized from a request URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    secure: bool,
}

impl Endpoint {
    pub fn from_uri(uri: &Uri) -> crate::Result<Self> {
        let Some(host) = uri.host() else {
            return Err(Error::MissingHost {
                uri: uri.to_string(),
            });
        };
        let secure = matches!(uri.scheme_str(), Some("https"));
        let port = uri.port_u16().unwrap_or(if secure { 443 } else { 80 });
        Ok(Self {
            host: host.to_ascii_lowercase(),
            port,
            secure,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Stable pool key for a (destination, proxy) pair.
///
/// Derivation is pure: the same host, port, and proxy configuration always
/// produce the same key, so repeated requests index the same pool slot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionKey(String);

impl ConnectionKey {
    pub fn new(endpoint: &Endpoint, proxy: Option<&ProxyTarget>) -> Self {
        let mut key = endpoint.authority();
        if let Some(proxy) = proxy {
            key.push_str(&proxy.key_fragment());
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}
