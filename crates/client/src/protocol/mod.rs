//! Message and failure types shared by transports and plugins.
//!
//! Requests and responses are plain `http` types with fully buffered
//! [`Bytes`] bodies. Both are values: a plugin that wants to change a request
//! builds a modified copy and forwards it, nothing is shared between calls.
//!
//! - [`Request`] / [`Response`]: the messages flowing through a chain
//! - [`ReasonPhrase`] / [`ResponseExt`]: status line reason phrase access
//! - [`Error`]: every failure a deferred result can be rejected with

use bytes::Bytes;

pub type Request = http::Request<Bytes>;
pub type Response = http::Response<Bytes>;

mod response;
pub use response::ReasonPhrase;
pub use response::ResponseExt;

mod error;
pub use error::BoxError;
pub use error::Error;
