use crate::deferred::Deferred;
use crate::protocol::{Error, Request, Response};
use crate::transport::{HttpAsyncClient, HttpClient};

/// Exposes a blocking transport as a non-blocking one.
///
/// `send_async` runs the blocking send on the calling thread and returns an
/// already resolved [`Deferred`].
#[derive(Debug, Clone)]
pub struct EmulatedAsyncClient<C> {
    client: C,
}

impl<C: HttpClient> EmulatedAsyncClient<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C: HttpClient> HttpClient for EmulatedAsyncClient<C> {
    fn send(&self, request: Request) -> Result<Response, Error> {
        self.client.send(request)
    }
}

impl<C: HttpClient> HttpAsyncClient for EmulatedAsyncClient<C> {
    fn send_async(&self, request: Request) -> Deferred {
        Deferred::from_result(self.client.send(request))
    }
}
