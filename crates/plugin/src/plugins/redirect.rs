//! Follows redirect responses.
//!
//! A redirect restarts the whole chain with the new request through `first`,
//! so every plugin sees the redirected request and redirect loops end with
//! [`Error::LoopExceeded`](micro_client::Error::LoopExceeded) once the restart
//! budget of the call is spent.

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, LOCATION, PROXY_AUTHORIZATION};
use http::{Method, StatusCode, Uri};
use micro_client::{Deferred, Request, Response};
use tracing::debug;

use crate::chain::{First, Next};
use crate::plugin::Plugin;

#[derive(Debug, Default, Clone, Copy)]
pub struct RedirectPlugin;

impl Plugin for RedirectPlugin {
    fn handle(&self, request: Request, next: Next, first: First) -> Deferred {
        let sent = request.clone();
        next.call(request).then(move |result| match result {
            Ok(response) if is_followed(response.status()) => match redirect_request(sent, &response) {
                Some(redirected) => {
                    debug!(status = response.status().as_u16(), location = %redirected.uri(), "following redirect");
                    first.call(redirected)
                }
                None => Deferred::fulfilled(response),
            },
            other => Deferred::from_result(other),
        })
    }
}

fn is_followed(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Builds the request to send after `response`, or `None` when the response
/// carries no usable `Location`.
fn redirect_request(mut request: Request, response: &Response) -> Option<Request> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    let uri = resolve(request.uri(), location)?;

    let status = response.status();
    let switch_to_get = status == StatusCode::SEE_OTHER
        || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND) && request.method() == Method::POST);

    if !same_origin(request.uri(), &uri) {
        let headers = request.headers_mut();
        headers.remove(AUTHORIZATION);
        headers.remove(PROXY_AUTHORIZATION);
        headers.remove(COOKIE);
    }

    *request.uri_mut() = uri;
    if switch_to_get && request.method() != Method::HEAD {
        *request.method_mut() = Method::GET;
        *request.body_mut() = Bytes::new();
        request.headers_mut().remove(CONTENT_TYPE);
        request.headers_mut().remove(CONTENT_LENGTH);
    }
    Some(request)
}

fn same_origin(a: &Uri, b: &Uri) -> bool {
    a.scheme() == b.scheme() && a.host() == b.host() && a.port_u16() == b.port_u16()
}

fn resolve(base: &Uri, location: &str) -> Option<Uri> {
    if location.contains("://") {
        return location.parse().ok();
    }
    if location.starts_with("//") {
        let scheme = base.scheme_str().unwrap_or("http");
        return format!("{scheme}:{location}").parse().ok();
    }

    let path_and_query = if location.starts_with('/') {
        location.to_owned()
    } else {
        let base_path = base.path();
        let dir = base_path.rfind('/').map_or("/", |index| &base_path[..=index]);
        format!("{dir}{location}")
    };

    let mut parts = base.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
