use http::{HeaderMap, HeaderName, HeaderValue};
use micro_client::{Deferred, Request};

use crate::chain::{First, Next};
use crate::plugin::Plugin;

/// Sets headers on every request, replacing any value already present.
#[derive(Debug, Clone, Default)]
pub struct HeaderSetPlugin {
    headers: HeaderMap,
}

impl HeaderSetPlugin {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

impl Plugin for HeaderSetPlugin {
    fn handle(&self, mut request: Request, next: Next, _first: First) -> Deferred {
        let headers = request.headers_mut();
        for name in self.headers.keys() {
            headers.remove(name);
            for value in self.headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        next.call(request)
    }
}
