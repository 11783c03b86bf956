use std::error::Error as StdError;

use http::StatusCode;
use thiserror::Error;

use crate::protocol::{Request, Response};

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Failures observed through a [`Deferred`](crate::Deferred).
///
/// Request and response are boxed to keep `Result<Response, Error>` small.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {source}")]
    Transport { request: Box<Request>, source: BoxError },

    #[error("client error: {message}")]
    ClientError { message: String, request: Box<Request>, response: Box<Response> },

    #[error("server error: {message}")]
    ServerError { message: String, request: Box<Request>, response: Box<Response> },

    #[error("too many restarts in plugin client, limit {max_restarts}")]
    LoopExceeded { max_restarts: usize, request: Box<Request> },

    #[error("plugin error: {source}")]
    Plugin { source: BoxError },
}

impl Error {
    pub fn transport<E: Into<BoxError>>(request: Request, source: E) -> Self {
        Self::Transport { request: Box::new(request), source: source.into() }
    }

    pub fn client_error<S: ToString>(message: S, request: Request, response: Response) -> Self {
        Self::ClientError { message: message.to_string(), request: Box::new(request), response: Box::new(response) }
    }

    pub fn server_error<S: ToString>(message: S, request: Request, response: Response) -> Self {
        Self::ServerError { message: message.to_string(), request: Box::new(request), response: Box::new(response) }
    }

    pub fn loop_exceeded(max_restarts: usize, request: Request) -> Self {
        Self::LoopExceeded { max_restarts, request: Box::new(request) }
    }

    pub fn plugin<E: Into<BoxError>>(source: E) -> Self {
        Self::Plugin { source: source.into() }
    }

    /// The request that was being processed when the failure happened, if known.
    pub fn request(&self) -> Option<&Request> {
        match self {
            Self::Transport { request, .. }
            | Self::ClientError { request, .. }
            | Self::ServerError { request, .. }
            | Self::LoopExceeded { request, .. } => Some(&**request),
            Self::Plugin { .. } => None,
        }
    }

    /// The response that caused a client or server error.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::ClientError { response, .. } | Self::ServerError { response, .. } => Some(&**response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(Response::status)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ClientError { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }

    pub fn is_loop_exceeded(&self) -> bool {
        matches!(self, Self::LoopExceeded { .. })
    }
}
