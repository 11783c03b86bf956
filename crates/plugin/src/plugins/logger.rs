use std::time::Instant;

use micro_client::{Deferred, Request};
use tracing::{info, warn};

use crate::chain::{First, Next};
use crate::plugin::Plugin;

/// Logs every exchange through `tracing`.
///
/// The request line is logged when the plugin is reached, the status or the
/// failure once the result resolves. Results are passed on untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggerPlugin;

impl Plugin for LoggerPlugin {
    fn handle(&self, request: Request, next: Next, _first: First) -> Deferred {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let started = Instant::now();
        info!(%method, %uri, "sending request");

        next.call(request).map(move |result| {
            match &result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    info!(%method, %uri, status, elapsed = ?started.elapsed(), "received response");
                }
                Err(e) => {
                    warn!(%method, %uri, cause = %e, elapsed = ?started.elapsed(), "request failed");
                }
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PluginClient;
    use crate::plugins::ErrorPlugin;
    use bytes::Bytes;
    use http::StatusCode;
    use micro_client::client_fn;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[derive(Debug, Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn request() -> Request {
        http::Request::builder().uri("http://localhost/health").body(Bytes::new()).unwrap()
    }

    #[test]
    fn logs_exchanges_without_altering_results() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = PluginClient::builder()
            .client(client_fn(|request: Request| {
                let status = if request.uri().path() == "/health" { StatusCode::OK } else { StatusCode::NOT_FOUND };
                Ok(http::Response::builder().status(status).body(Bytes::from_static(b"up")).unwrap())
            }))
            .plugin(LoggerPlugin)
            .plugin(ErrorPlugin::new())
            .build()
            .unwrap();

        let response = client.send(request()).unwrap();
        assert_eq!(response.body(), &Bytes::from_static(b"up"));

        let logs = captured.text();
        assert!(logs.contains("sending request"));
        assert!(logs.contains("received response"));
        assert!(logs.contains("status=200"));
        assert!(!logs.contains("request failed"));

        let missing = http::Request::builder().uri("http://localhost/missing").body(Bytes::new()).unwrap();
        assert!(client.send(missing).unwrap_err().is_client_error());

        let logs = captured.text();
        assert!(logs.contains("request failed"));
        assert!(logs.contains("/missing"));
    }
}
