//! The two ways of sending a request.
//!
//! A transport implements [`HttpClient`] (blocking), [`HttpAsyncClient`]
//! (returns a [`Deferred`] without blocking), or both. Closures can be turned
//! into transports with [`client_fn`] and [`async_client_fn`], and a blocking
//! transport can stand in for a non-blocking one through
//! [`EmulatedAsyncClient`].

mod emulated;

pub use emulated::EmulatedAsyncClient;

use std::fmt;
use std::sync::Arc;

use crate::deferred::Deferred;
use crate::protocol::{Error, Request, Response};

/// A transport that sends a request and blocks until the response arrives.
pub trait HttpClient: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the exchange could not be completed.
    fn send(&self, request: Request) -> Result<Response, Error>;
}

/// A transport that sends a request without blocking the caller.
pub trait HttpAsyncClient: Send + Sync {
    fn send_async(&self, request: Request) -> Deferred;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn send(&self, request: Request) -> Result<Response, Error> {
        (**self).send(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Box<T> {
    fn send(&self, request: Request) -> Result<Response, Error> {
        (**self).send(request)
    }
}

impl<T: HttpAsyncClient + ?Sized> HttpAsyncClient for Arc<T> {
    fn send_async(&self, request: Request) -> Deferred {
        (**self).send_async(request)
    }
}

impl<T: HttpAsyncClient + ?Sized> HttpAsyncClient for Box<T> {
    fn send_async(&self, request: Request) -> Deferred {
        (**self).send_async(request)
    }
}

/// a blocking transport backed by a closure
#[derive(Clone)]
pub struct ClientFn<F> {
    f: F,
}

impl<F> HttpClient for ClientFn<F>
where
    F: Fn(Request) -> Result<Response, Error> + Send + Sync,
{
    fn send(&self, request: Request) -> Result<Response, Error> {
        (self.f)(request)
    }
}

impl<F> fmt::Debug for ClientFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFn").finish_non_exhaustive()
    }
}

pub fn client_fn<F>(f: F) -> ClientFn<F>
where
    F: Fn(Request) -> Result<Response, Error> + Send + Sync,
{
    ClientFn { f }
}

/// a non-blocking transport backed by a closure returning a future
#[derive(Clone)]
pub struct AsyncClientFn<F> {
    f: F,
}

impl<F, Fut> HttpAsyncClient for AsyncClientFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn send_async(&self, request: Request) -> Deferred {
        Deferred::from_future((self.f)(request))
    }
}

impl<F> fmt::Debug for AsyncClientFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncClientFn").finish_non_exhaustive()
    }
}

pub fn async_client_fn<F, Fut>(f: F) -> AsyncClientFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    AsyncClientFn { f }
}
