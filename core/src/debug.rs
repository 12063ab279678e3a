//! Debug decorator: captures the last request and response.
//!
//! # Design
//! Captured values live in a `DebugSink`. Every `DebugClient` owns an instance
//! sink (off by default) and shares a process sink (on by default). The
//! process sink is `DebugSink::global()` unless another one is injected, which
//! tests and concurrent hosts should prefer. Sinks are best-effort diagnostic
//! state: concurrent calls race for the slots and the last writer wins.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::client::{Forward, HttpClient, Interceptor};
use crate::error::Result;
use crate::request::{AnyRequest, Flavor, Request};
use crate::response::{AnyResponse, Response};

#[derive(Default)]
struct Slots {
    request: Option<Arc<dyn AnyRequest>>,
    response: Option<Arc<dyn AnyResponse>>,
}

/// Switchable holder of the last captured request and response.
pub struct DebugSink {
    enabled: AtomicBool,
    slots: Mutex<Slots>,
}

impl DebugSink {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            slots: Mutex::new(Slots::default()),
        }
    }

    /// Process-wide sink shared by every `DebugClient` that was not given one.
    pub fn global() -> Arc<DebugSink> {
        static GLOBAL: OnceLock<Arc<DebugSink>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DebugSink::new(true))))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn last_request(&self) -> Option<Arc<dyn AnyRequest>> {
        self.lock().request.clone()
    }

    pub fn last_response(&self) -> Option<Arc<dyn AnyResponse>> {
        self.lock().response.clone()
    }

    pub fn clear(&self) {
        *self.lock() = Slots::default();
    }

    /// Start of a call: store the request when enabled, drop stale values.
    fn begin(&self, request: &Arc<dyn AnyRequest>) {
        let enabled = self.is_enabled();
        let mut slots = self.lock();
        slots.request = enabled.then(|| Arc::clone(request));
        slots.response = None;
    }

    fn finish(&self, response: &Arc<dyn AnyResponse>) {
        if self.is_enabled() {
            self.lock().response = Some(Arc::clone(response));
        }
    }

    // A panic while holding the lock cannot leave the slots half-written.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DebugSink {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.lock();
        f.debug_struct("DebugSink")
            .field("enabled", &self.is_enabled())
            .field("request", &slots.request)
            .field("response", &slots.response)
            .finish()
    }
}

/// Decorator recording traffic into its instance sink and the process sink.
#[derive(Debug)]
pub struct DebugClient<C, I = Forward> {
    inner: C,
    interceptor: I,
    instance: DebugSink,
    process: Arc<DebugSink>,
}

impl<C: HttpClient> DebugClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            interceptor: Forward,
            instance: DebugSink::default(),
            process: DebugSink::global(),
        }
    }
}

impl<C: HttpClient, I: Interceptor> DebugClient<C, I> {
    /// Replace the process sink, e.g. with one private to a test.
    pub fn with_process_sink(mut self, sink: Arc<DebugSink>) -> Self {
        self.process = sink;
        self
    }

    /// Route calls through `interceptor` instead of straight to the client.
    pub fn with_interceptor<J: Interceptor>(self, interceptor: J) -> DebugClient<C, J> {
        DebugClient {
            inner: self.inner,
            interceptor,
            instance: self.instance,
            process: self.process,
        }
    }

    pub fn set_debug(&self, enabled: bool) -> &Self {
        self.instance.set_enabled(enabled);
        self
    }

    pub fn is_debug(&self) -> bool {
        self.instance.is_enabled()
    }

    pub fn last_request(&self) -> Option<Arc<dyn AnyRequest>> {
        self.instance.last_request()
    }

    pub fn last_response(&self) -> Option<Arc<dyn AnyResponse>> {
        self.instance.last_response()
    }

    pub fn process_sink(&self) -> &Arc<DebugSink> {
        &self.process
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: HttpClient, I: Interceptor> HttpClient for DebugClient<C, I> {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
        let captured: Arc<dyn AnyRequest> = Arc::new(request.clone());
        self.instance.begin(&captured);
        self.process.begin(&captured);
        tracing::trace!(method = %request.method(), url = %request.url(), "debug client dispatch");

        let response = self.interceptor.intercept(request, &self.inner)?;

        let captured: Arc<dyn AnyResponse> = Arc::new(response.clone());
        self.instance.finish(&captured);
        self.process.finish(&captured);
        tracing::trace!(http_code = response.http_code(), "debug client response");
        Ok(response)
    }
}
