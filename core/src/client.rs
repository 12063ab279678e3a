//! Client contract and the middleware decorator.
//!
//! # Design
//! `HttpClient` is the single capability every client shares: turn a
//! `Request<F>` into a `Response<F>`. Transports, decorators and test doubles
//! all implement it, so they compose by wrapping one another.
//!
//! Request rewriting and response substitution go through an `Interceptor`
//! instead of a captured closure. An interceptor receives the request and the
//! next client; it decides whether (and with what) to forward.

use std::sync::Arc;

use crate::error::Result;
use crate::request::{Flavor, Request};
use crate::response::Response;

/// Anything that can execute a request.
pub trait HttpClient {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
        (**self).request(request)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
        (**self).request(request)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for Box<C> {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
        (**self).request(request)
    }
}

/// Hook placed in front of a client.
///
/// Implementations either call `next.request(..)` (possibly with a rewritten
/// request) or return a response of their own without touching `next`.
pub trait Interceptor {
    fn intercept<F: Flavor, C: HttpClient + ?Sized>(
        &self,
        request: Request<F>,
        next: &C,
    ) -> Result<Response<F>>;

    /// Run `self` first, then `second`, then the client.
    fn then<I: Interceptor>(self, second: I) -> Chain<Self, I>
    where
        Self: Sized,
    {
        Chain {
            first: self,
            second,
        }
    }
}

/// Forwards every request unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

impl Interceptor for Forward {
    fn intercept<F: Flavor, C: HttpClient + ?Sized>(
        &self,
        request: Request<F>,
        next: &C,
    ) -> Result<Response<F>> {
        next.request(request)
    }
}

/// Two interceptors run in sequence. Built with [`Interceptor::then`].
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A: Interceptor, B: Interceptor> Interceptor for Chain<A, B> {
    fn intercept<F: Flavor, C: HttpClient + ?Sized>(
        &self,
        request: Request<F>,
        next: &C,
    ) -> Result<Response<F>> {
        let next = Intercepted {
            interceptor: &self.second,
            client: next,
        };
        self.first.intercept(request, &next)
    }
}

/// A client with one interceptor in front of it.
struct Intercepted<'a, I, C: ?Sized> {
    interceptor: &'a I,
    client: &'a C,
}

impl<I: Interceptor, C: HttpClient + ?Sized> HttpClient for Intercepted<'_, I, C> {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
        self.interceptor.intercept(request, self.client)
    }
}

/// Appends fixed header lines to every request, e.g. an `Authorization` line.
#[derive(Debug, Clone, Default)]
pub struct AddHeaders {
    lines: Vec<String>,
}

impl AddHeaders {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl Interceptor for AddHeaders {
    fn intercept<F: Flavor, C: HttpClient + ?Sized>(
        &self,
        mut request: Request<F>,
        next: &C,
    ) -> Result<Response<F>> {
        for line in &self.lines {
            request.add_header(line.clone());
        }
        next.request(request)
    }
}

/// Decorator that routes every request through an interceptor.
#[derive(Debug, Clone)]
pub struct MiddlewareClient<C, I = Forward> {
    inner: C,
    interceptor: I,
}

impl<C: HttpClient> MiddlewareClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            interceptor: Forward,
        }
    }
}

impl<C: HttpClient, I: Interceptor> MiddlewareClient<C, I> {
    pub fn with_interceptor(inner: C, interceptor: I) -> Self {
        Self { inner, interceptor }
    }

    /// Swap the interceptor, keeping the wrapped client.
    pub fn set_interceptor<J: Interceptor>(self, interceptor: J) -> MiddlewareClient<C, J> {
        MiddlewareClient {
            inner: self.inner,
            interceptor,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn interceptor(&self) -> &I {
        &self.interceptor
    }
}

impl<C: HttpClient, I: Interceptor> HttpClient for MiddlewareClient<C, I> {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
        self.interceptor.intercept(request, &self.inner)
    }
}
