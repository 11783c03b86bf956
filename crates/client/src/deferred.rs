//! Single-resolution results of an HTTP exchange.
//!
//! A [`Deferred`] is either already resolved (fulfilled with a [`Response`]
//! or rejected with an [`Error`]) or pending on a boxed future. Continuations
//! attached with [`Deferred::then`] run immediately on the calling thread when
//! the value is already there, and are chained onto the future otherwise, so
//! code that transforms results works the same for blocking and non-blocking
//! transports.
//!
//! Resolution happens at most once: every operation consumes the deferred.

use std::fmt;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::executor::block_on;
use futures::future::BoxFuture;

use crate::protocol::{Error, Response};

/// Observable state of a [`Deferred`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    Pending,
    Fulfilled,
    Rejected,
    /// The value was already taken by polling the deferred to completion.
    Consumed,
}

pub struct Deferred {
    inner: Inner,
}

enum Inner {
    Fulfilled(Response),
    Rejected(Error),
    Pending(BoxFuture<'static, Result<Response, Error>>),
    Consumed,
}

impl Deferred {
    pub fn fulfilled(response: Response) -> Self {
        Self { inner: Inner::Fulfilled(response) }
    }

    pub fn rejected(error: Error) -> Self {
        Self { inner: Inner::Rejected(error) }
    }

    pub fn from_result(result: Result<Response, Error>) -> Self {
        match result {
            Ok(response) => Self::fulfilled(response),
            Err(error) => Self::rejected(error),
        }
    }

    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Response, Error>> + Send + 'static,
    {
        Self { inner: Inner::Pending(future.boxed()) }
    }

    pub fn state(&self) -> DeferredState {
        match self.inner {
            Inner::Fulfilled(_) => DeferredState::Fulfilled,
            Inner::Rejected(_) => DeferredState::Rejected,
            Inner::Pending(_) => DeferredState::Pending,
            Inner::Consumed => DeferredState::Consumed,
        }
    }

    /// Attaches `f` to run once this deferred resolves, successfully or not.
    ///
    /// A resolved deferred runs `f` right away and returns whatever `f`
    /// returns, so a chain of `then` calls over resolved values never
    /// allocates a future.
    pub fn then<F>(self, f: F) -> Deferred
    where
        F: FnOnce(Result<Response, Error>) -> Deferred + Send + 'static,
    {
        match self.inner {
            Inner::Fulfilled(response) => f(Ok(response)),
            Inner::Rejected(error) => f(Err(error)),
            Inner::Pending(future) => Deferred::from_future(async move { f(future.await).await }),
            inner @ Inner::Consumed => Deferred { inner },
        }
    }

    /// Like [`then`](Self::then) for continuations that produce a plain result.
    pub fn map<F>(self, f: F) -> Deferred
    where
        F: FnOnce(Result<Response, Error>) -> Result<Response, Error> + Send + 'static,
    {
        self.then(|result| Deferred::from_result(f(result)))
    }

    /// Blocks the current thread until the deferred is resolved.
    ///
    /// Resolved values are returned without touching an executor; pending
    /// ones are driven by [`futures::executor::block_on`], which must not be
    /// called from inside an async task.
    ///
    /// # Panics
    ///
    /// Panics if the deferred was already polled to completion.
    pub fn wait(self) -> Result<Response, Error> {
        match self.inner {
            Inner::Fulfilled(response) => Ok(response),
            Inner::Rejected(error) => Err(error),
            inner => block_on(Deferred { inner }),
        }
    }
}

impl From<Result<Response, Error>> for Deferred {
    fn from(result: Result<Response, Error>) -> Self {
        Self::from_result(result)
    }
}

impl Future for Deferred {
    type Output = Result<Response, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match mem::replace(&mut this.inner, Inner::Consumed) {
            Inner::Fulfilled(response) => Poll::Ready(Ok(response)),
            Inner::Rejected(error) => Poll::Ready(Err(error)),
            Inner::Pending(mut future) => match future.poll_unpin(cx) {
                Poll::Ready(output) => Poll::Ready(output),
                Poll::Pending => {
                    this.inner = Inner::Pending(future);
                    Poll::Pending
                }
            },
            Inner::Consumed => panic!("`Deferred` polled after completion"),
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("state", &self.state()).finish()
    }
}
