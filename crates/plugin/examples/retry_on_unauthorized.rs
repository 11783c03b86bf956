use std::time::Duration;

use bytes::Bytes;
use http::{HeaderValue, StatusCode, header};
use micro_client::{Deferred, Request, async_client_fn};
use micro_plugin::plugins::{ErrorPlugin, LoggerPlugin};
use micro_plugin::{First, Next, PluginClient, plugin_fn};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // pretends to be a server that wants a bearer token
    let transport = async_client_fn(|request: Request| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let status = match request.headers().get(header::AUTHORIZATION) {
            Some(_) => StatusCode::OK,
            None => StatusCode::UNAUTHORIZED,
        };
        Ok(http::Response::builder().status(status).body(Bytes::from_static(b"hello")).unwrap())
    });

    let authenticate = plugin_fn("authenticate", |request: Request, next: Next, first: First| {
        let retry = request.clone();
        next.call(request).then(move |result| match result {
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                info!("token rejected, logging in again");
                let mut retry = retry;
                retry.headers_mut().insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
                first.call(retry)
            }
            other => Deferred::from_result(other),
        })
    });

    let client = PluginClient::builder()
        .async_client(transport)
        .plugin(LoggerPlugin)
        .plugin(ErrorPlugin::new())
        .plugin(authenticate)
        .max_restarts(2)
        .build()
        .expect("transport is set");

    let request = http::Request::builder().uri("http://localhost:3000/profile").body(Bytes::new()).unwrap();
    match client.send_async(request).await {
        Ok(response) => info!(status = response.status().as_u16(), "done"),
        Err(e) => error!(cause = %e, "request failed"),
    }
}
