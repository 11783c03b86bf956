//! Minimal HTTP client abstractions
//!
//! This crate defines the boundary between code that *uses* an HTTP client and
//! code that *implements* one. It deliberately contains no networking: a
//! transport is anything that implements [`HttpClient`] or [`HttpAsyncClient`].
//!
//! # Core Components
//!
//! ## Messages
//!
//! [`Request`] and [`Response`] are `http` types with buffered [`bytes::Bytes`]
//! bodies. Custom reason phrases travel as the [`ReasonPhrase`] extension and
//! are read back with [`ResponseExt::reason_phrase`].
//!
//! ## Deferred results
//!
//! [`Deferred`] is the single-resolution result of an exchange. It may already
//! be resolved, which is what blocking transports produce, or pending on a
//! future. Continuations attached with [`Deferred::then`] and
//! [`Deferred::map`] behave the same in both cases, and [`Deferred::wait`]
//! blocks until the outcome is known.
//!
//! ## Transports
//!
//! - [`HttpClient`]: blocking send
//! - [`HttpAsyncClient`]: non-blocking send returning a [`Deferred`]
//! - [`client_fn`] / [`async_client_fn`]: build transports from closures
//! - [`EmulatedAsyncClient`]: adapt a blocking transport to the non-blocking API
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use micro_client::{client_fn, EmulatedAsyncClient, HttpAsyncClient};
//!
//! let client = EmulatedAsyncClient::new(client_fn(|_request| {
//!     Ok(http::Response::new(Bytes::from_static(b"hello")))
//! }));
//!
//! let request = http::Request::builder().uri("http://localhost/").body(Bytes::new()).unwrap();
//! let response = client.send_async(request).wait().unwrap();
//! assert_eq!(response.body(), &Bytes::from_static(b"hello"));
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`Error`]. Transports report [`Error::Transport`];
//! the remaining variants are produced by code layered on top, such as
//! plugins classifying status codes.

mod deferred;

pub mod protocol;
pub mod transport;

pub use deferred::Deferred;
pub use deferred::DeferredState;
pub use protocol::{BoxError, Error, ReasonPhrase, Request, Response, ResponseExt};
pub use transport::{
    AsyncClientFn, ClientFn, EmulatedAsyncClient, HttpAsyncClient, HttpClient, async_client_fn, client_fn,
};
