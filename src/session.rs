use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use http::Uri;
use http::header::{CONNECTION, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::client::Shared;
use crate::endpoint::{ConnectionKey, Endpoint};
use crate::error::{Error, TransportError, TransportErrorKind};
use crate::request::Request;
use crate::response::Response;
use crate::transport::{Connection, ConnectionId, Connector};

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");

struct PooledConnection<T> {
    id: ConnectionId,
    endpoint: Endpoint,
    transport: T,
}

impl<T> PooledConnection<T> {
    fn new(endpoint: Endpoint, transport: T) -> Self {
        Self {
            id: ConnectionId::next(),
            endpoint,
            transport,
        }
    }
}

enum Attempt {
    Success(Response),
    Failure {
        connection: ConnectionId,
        requests: u64,
        error: TransportError,
    },
}

/// Connection state owned by one execution context.
///
/// A session keeps one live connection per destination key and reuses it for
/// every request that context issues, so requests against the same
/// destination are serialized in send order. Sessions are never shared
/// across threads; mint one per context from [`Client::session`] and call
/// [`shutdown`](Session::shutdown) when the context finishes. Nothing else
/// closes the pooled connections.
///
/// [`Client::session`]: crate::Client::session
pub struct Session<C: Connector> {
    shared: Arc<Shared<C>>,
    connections: HashMap<ConnectionKey, PooledConnection<C::Conn>>,
    request_counts: HashMap<ConnectionId, u64>,
}

impl<C: Connector> Session<C> {
    pub(crate) fn new(shared: Arc<Shared<C>>) -> Self {
        Self {
            shared,
            connections: HashMap::new(),
            request_counts: HashMap::new(),
        }
    }

    /// Sends `request` (or a synthesized GET) to the destination named by
    /// `uri` over this context's pooled connection.
    ///
    /// A malformed response from the far end and an interrupted transport
    /// each earn one inline reset-and-retry; a second failure of the same
    /// class within this call is surfaced with the request count and
    /// connection id attached. Other failures propagate immediately with
    /// the original cause wrapped.
    pub fn execute(&mut self, uri: &Uri, request: Option<Request>) -> crate::Result<Response> {
        let endpoint = Endpoint::from_uri(uri)?;
        let key = ConnectionKey::new(&endpoint, self.shared.proxy.as_ref());
        let request = self.prepare_request(uri, request);

        let mut retried_bad_response = false;
        let mut retried_reset = false;
        loop {
            match self.attempt_send(&key, &endpoint, &request)? {
                Attempt::Success(response) => return Ok(response),
                Attempt::Failure {
                    connection,
                    requests,
                    error,
                } => match error.kind() {
                    TransportErrorKind::BadResponse if !retried_bad_response => {
                        retried_bad_response = true;
                        warn!(
                            client = %self.shared.name,
                            connection = %connection,
                            cause = %error,
                            "bad response, resetting connection and retrying"
                        );
                        self.reset(&key)?;
                    }
                    TransportErrorKind::BadResponse => {
                        return Err(Error::TooManyBadResponses {
                            requests,
                            connection,
                        });
                    }
                    TransportErrorKind::Interrupted if !retried_reset => {
                        retried_reset = true;
                        warn!(
                            client = %self.shared.name,
                            connection = %connection,
                            cause = %error,
                            "connection interrupted, resetting and retrying"
                        );
                        self.reset(&key)?;
                    }
                    TransportErrorKind::Interrupted => {
                        return Err(Error::TooManyResets {
                            cause: error.to_string(),
                            requests,
                            connection,
                            source: error,
                        });
                    }
                    kind => {
                        return Err(Error::Transport {
                            kind,
                            method: request.method().clone(),
                            target: request.target().to_owned(),
                            source: error,
                        });
                    }
                },
            }
        }
    }

    /// Closes every pooled connection and clears this context's state.
    /// Calling it with nothing open, or calling it twice, is a no-op.
    pub fn shutdown(&mut self) {
        for (_, mut entry) in self.connections.drain() {
            if let Err(error) = entry.transport.close() {
                debug!(
                    connection = %entry.id,
                    cause = %error,
                    "ignoring close failure during shutdown"
                );
            }
        }
        self.request_counts.clear();
    }

    /// Number of live pooled connections in this context.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Requests served so far by the pooled connection for `uri`, if one
    /// exists in this context.
    pub fn requests_on(&self, uri: &Uri) -> Option<u64> {
        let endpoint = Endpoint::from_uri(uri).ok()?;
        let key = ConnectionKey::new(&endpoint, self.shared.proxy.as_ref());
        let entry = self.connections.get(&key)?;
        self.request_counts.get(&entry.id).copied()
    }

    fn prepare_request(&self, uri: &Uri, request: Option<Request>) -> Request {
        let mut request = request.unwrap_or_else(|| Request::default_for(uri));
        for (name, value) in &self.shared.default_headers {
            request.append_header(name.clone(), value.clone());
        }
        request.append_header(CONNECTION, HeaderValue::from_static("keep-alive"));
        request.append_header(KEEP_ALIVE, HeaderValue::from(self.shared.keep_alive.as_secs()));
        for (name, value) in &self.shared.override_headers {
            request.set_header(name.clone(), value.clone());
        }
        request
    }

    /// One pass through the pool: obtain (creating and starting as needed),
    /// count, send. Pool and start failures are fatal here; send failures
    /// are handed back for classification.
    fn attempt_send(
        &mut self,
        key: &ConnectionKey,
        endpoint: &Endpoint,
        request: &Request,
    ) -> crate::Result<Attempt> {
        let shared = Arc::clone(&self.shared);
        let entry = match self.connections.entry(key.clone()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let transport = shared.connector.connect(endpoint, shared.proxy.as_ref());
                let entry = PooledConnection::new(endpoint.clone(), transport);
                debug!(
                    client = %shared.name,
                    connection = %entry.id,
                    key = %key,
                    "opening pooled connection"
                );
                slot.insert(entry)
            }
        };
        if !entry.transport.is_started() {
            arm_and_start(&shared, entry)?;
        }

        let counter = self.request_counts.entry(entry.id).or_insert(0);
        *counter += 1;
        let requests = *counter;

        match entry.transport.send(request) {
            Ok(response) => Ok(Attempt::Success(response)),
            Err(error) => Ok(Attempt::Failure {
                connection: entry.id,
                requests,
                error,
            }),
        }
    }

    /// Discards the pooled connection for `key` and replaces it with a
    /// freshly started one. The old transport's close failure is swallowed;
    /// the connection is being thrown away regardless. A refused or
    /// unreachable replacement is fatal, with the unstarted replacement left
    /// in the pool for a later attempt.
    fn reset(&mut self, key: &ConnectionKey) -> crate::Result<()> {
        let Some(mut stale) = self.connections.remove(key) else {
            return Ok(());
        };
        self.request_counts.remove(&stale.id);
        if let Err(error) = stale.transport.close() {
            debug!(
                connection = %stale.id,
                cause = %error,
                "ignoring close failure during reset"
            );
        }

        let shared = Arc::clone(&self.shared);
        let endpoint = stale.endpoint;
        let transport = shared.connector.connect(&endpoint, shared.proxy.as_ref());
        let mut fresh = PooledConnection::new(endpoint, transport);
        debug!(
            client = %shared.name,
            connection = %fresh.id,
            key = %key,
            "replacing reset connection"
        );
        let started = arm_and_start(&shared, &mut fresh);
        self.connections.insert(key.clone(), fresh);
        started
    }
}

fn arm_and_start<C: Connector>(
    shared: &Shared<C>,
    entry: &mut PooledConnection<C::Conn>,
) -> crate::Result<()> {
    if let Some(sink) = &shared.debug_sink {
        entry.transport.set_debug_sink(Arc::clone(sink));
    }
    entry.transport.set_timeouts(shared.open_timeout, shared.read_timeout);
    if entry.endpoint.secure() {
        entry.transport.configure_tls(&shared.tls);
    }
    entry
        .transport
        .start()
        .map_err(|source| start_failure(&entry.endpoint, source))?;
    debug!(
        connection = %entry.id,
        authority = %entry.endpoint.authority(),
        "connection started"
    );
    Ok(())
}

fn start_failure(endpoint: &Endpoint, source: TransportError) -> Error {
    match source.kind() {
        TransportErrorKind::Refused => Error::ConnectionRefused {
            host: endpoint.host().to_owned(),
            port: endpoint.port(),
            source,
        },
        TransportErrorKind::HostDown => Error::HostDown {
            host: endpoint.host().to_owned(),
            port: endpoint.port(),
            source,
        },
        _ => Error::Start {
            host: endpoint.host().to_owned(),
            port: endpoint.port(),
            source,
        },
    }
}
