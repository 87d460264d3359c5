//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use reconn::{
    Connection, Connector, Endpoint, ProxyTarget, Request, Response, TransportError,
    TransportErrorKind,
};

pub enum SendOutcome {
    Respond(u16),
    Fail(TransportErrorKind, &'static str),
}

/// Connector whose connections replay a scripted sequence of send outcomes
/// and start results, recording everything the client does to them.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    outcomes: Arc<Mutex<VecDeque<SendOutcome>>>,
    start_results: Arc<Mutex<VecDeque<Result<(), (TransportErrorKind, &'static str)>>>>,
    sent: Arc<Mutex<Vec<Request>>>,
    connects: Arc<AtomicUsize>,
    starts: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_outcome(&self, outcome: SendOutcome) {
        self.outcomes.lock().expect("lock outcomes").push_back(outcome);
    }

    pub fn push_start_result(
        &self,
        result: Result<(), (TransportErrorKind, &'static str)>,
    ) {
        self.start_results
            .lock()
            .expect("lock start results")
            .push_back(result);
    }

    pub fn sent_requests(&self) -> Vec<Request> {
        self.sent.lock().expect("lock sent requests").clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().expect("lock sent requests").len()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Connector for ScriptedConnector {
    type Conn = ScriptedConnection;

    fn connect(&self, _endpoint: &Endpoint, _proxy: Option<&ProxyTarget>) -> ScriptedConnection {
        self.connects.fetch_add(1, Ordering::SeqCst);
        ScriptedConnection {
            script: self.clone(),
            started: false,
        }
    }
}

pub struct ScriptedConnection {
    script: ScriptedConnector,
    started: bool,
}

impl Connection for ScriptedConnection {
    fn is_started(&self) -> bool {
        self.started
    }

    fn start(&mut self) -> Result<(), TransportError> {
        match self
            .script
            .start_results
            .lock()
            .expect("lock start results")
            .pop_front()
        {
            Some(Err((kind, message))) => Err(TransportError::new(kind, message)),
            Some(Ok(())) | None => {
                self.started = true;
                self.script.starts.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    fn send(&mut self, request: &Request) -> Result<Response, TransportError> {
        self.script
            .sent
            .lock()
            .expect("lock sent requests")
            .push(request.clone());
        match self.script.outcomes.lock().expect("lock outcomes").pop_front() {
            Some(SendOutcome::Fail(kind, message)) => Err(TransportError::new(kind, message)),
            Some(SendOutcome::Respond(status)) => Ok(response_with_status(status)),
            None => Ok(response_with_status(200)),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.started = false;
        self.script.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn response_with_status(status: u16) -> Response {
    Response::new(
        StatusCode::from_u16(status).expect("valid status code"),
        HeaderMap::new(),
        Bytes::new(),
    )
}

pub fn uri(text: &str) -> http::Uri {
    text.parse().expect("valid test uri")
}
