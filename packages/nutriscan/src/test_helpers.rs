//! Scripted transport, environment and log capture helpers for unit tests

use crate::error::TransportError;
use crate::service::{InferenceTransport, RawResponse, ServiceRequest};
use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Runs a function with all NS_ environment variables unset
pub(crate) fn with_no_ns_vars<F: FnOnce() -> R, R>(f: F) -> R {
    let ns_vars = std::env::vars()
        .map(|(k, _v)| k)
        .filter(|k| k.starts_with("NS_"))
        .collect::<Vec<_>>();

    temp_env::with_vars_unset(&ns_vars, f)
}

///
/// What a `ScriptedTransport` does with one request: wait, then answer
///
#[derive(Clone, Debug)]
pub(crate) struct Scripted {
    pub delay: Duration,
    pub response: Result<RawResponse, TransportError>,
}

impl Scripted {
    pub(crate) fn status(status: u16, body: serde_json::Value) -> Self {
        Scripted::raw(status, body.to_string())
    }

    pub(crate) fn raw(status: u16, body: impl Into<bytes::Bytes>) -> Self {
        Scripted {
            delay: Duration::ZERO,
            response: Ok(RawResponse::new(status, body)),
        }
    }
}

pub(crate) fn ok_json(body: serde_json::Value) -> Scripted {
    Scripted::status(200, body)
}

type Script = Box<dyn Fn(&ServiceRequest) -> Scripted + Send + Sync>;

///
/// In-memory transport answering from a script and recording every request
///
pub(crate) struct ScriptedTransport {
    script: Script,
    requests: Mutex<Vec<ServiceRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(&ServiceRequest) -> Scripted + Send + Sync + 'static,
    {
        ScriptedTransport {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ServiceRequest> {
        self.requests.lock().expect("lock shouldn't be poisoned").clone()
    }
}

#[async_trait]
impl InferenceTransport for ScriptedTransport {
    fn endpoint(&self, path: &str) -> String {
        format!("http://scripted{path}")
    }

    async fn send(&self, request: ServiceRequest) -> Result<RawResponse, TransportError> {
        let scripted = (self.script)(&request);

        self.requests
            .lock()
            .expect("lock shouldn't be poisoned")
            .push(request);

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        scripted.response
    }
}

// Mock Writer for flexibly testing the logging behaviour, copy-pasted from
// tracing_subscriber's internal test code (with JSON functionality deleted).
// https://github.com/tokio-rs/tracing/blob/b02a700ba6850ad813f77e65144114f866074a8f/tracing-subscriber/src/fmt/mod.rs#L1247-L1314
pub(crate) struct MockWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MockWriter {
    pub(crate) fn new(buf: Arc<Mutex<Vec<u8>>>) -> Self {
        Self { buf }
    }

    pub(crate) fn map_error<Guard>(err: TryLockError<Guard>) -> io::Error {
        match err {
            TryLockError::WouldBlock => io::Error::from(io::ErrorKind::WouldBlock),
            TryLockError::Poisoned(_) => io::Error::from(io::ErrorKind::Other),
        }
    }

    pub(crate) fn buf(&self) -> io::Result<MutexGuard<'_, Vec<u8>>> {
        self.buf.try_lock().map_err(Self::map_error)
    }
}

impl io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buf()?.flush()
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockMakeWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MockMakeWriter {
    pub(crate) fn get_string(&self) -> String {
        let mut buf = self.buf.lock().expect("lock shouldn't be poisoned");
        let string = std::str::from_utf8(&buf[..])
            .expect("formatter should not have produced invalid utf-8")
            .to_owned();
        buf.clear();
        string
    }
}

impl<'a> MakeWriter<'a> for MockMakeWriter {
    type Writer = MockWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MockWriter::new(self.buf.clone())
    }
}
