//! Status code classification.
//!
//! [`ErrorPlugin`] turns 4xx responses into [`Error::ClientError`] and 5xx
//! responses into [`Error::ServerError`], so callers see HTTP failures through
//! the same channel as transport failures. The check is attached to the
//! deferred returned by `next`, so it never blocks and behaves the same for
//! resolved and pending results.

use micro_client::{Deferred, Error, Request, Response, ResponseExt};

use crate::chain::{First, Next};
use crate::plugin::Plugin;

#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorPlugin {
    only_server_errors: bool,
}

impl ErrorPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// An `ErrorPlugin` that lets 4xx responses through and only rejects 5xx.
    pub fn only_server_errors() -> Self {
        Self { only_server_errors: true }
    }
}

impl Plugin for ErrorPlugin {
    fn handle(&self, request: Request, next: Next, _first: First) -> Deferred {
        let only_server_errors = self.only_server_errors;
        let sent = request.clone();
        next.call(request).map(move |result| result.and_then(|response| classify(sent, response, only_server_errors)))
    }
}

fn classify(request: Request, response: Response, only_server_errors: bool) -> Result<Response, Error> {
    let status = response.status();
    if status.is_client_error() && !only_server_errors {
        return Err(Error::client_error(message(&response), request, response));
    }
    if status.is_server_error() {
        return Err(Error::server_error(message(&response), request, response));
    }
    Ok(response)
}

fn message(response: &Response) -> String {
    format!("{} {}", response.status().as_u16(), response.reason_phrase()).trim_end().to_owned()
}
