use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use micro_client::{Deferred, EmulatedAsyncClient, Error, HttpAsyncClient, HttpClient, Request, Response};
use thiserror::Error;
use tracing::debug;

use crate::chain::Chain;
use crate::config::PluginClientConfig;
use crate::plugin::Plugin;

pub struct PluginClientBuilder {
    sync_client: Option<Arc<dyn HttpClient>>,
    async_client: Option<Arc<dyn HttpAsyncClient>>,
    plugins: Vec<Arc<dyn Plugin>>,
    config: PluginClientConfig,
}

impl PluginClientBuilder {
    fn new() -> Self {
        Self { sync_client: None, async_client: None, plugins: vec![], config: PluginClientConfig::default() }
    }

    /// Sets the blocking transport.
    ///
    /// Without a non-blocking transport, `send_async` runs this one through
    /// an [`EmulatedAsyncClient`].
    pub fn client<C: HttpClient + 'static>(mut self, client: C) -> Self {
        self.sync_client = Some(Arc::new(client));
        self
    }

    /// Sets the non-blocking transport.
    ///
    /// Without a blocking transport, `send` waits on this one.
    pub fn async_client<C: HttpAsyncClient + 'static>(mut self, client: C) -> Self {
        self.async_client = Some(Arc::new(client));
        self
    }

    /// Sets one transport for both the blocking and the non-blocking path.
    pub fn full_client<C: HttpClient + HttpAsyncClient + 'static>(mut self, client: C) -> Self {
        let client = Arc::new(client);
        self.sync_client = Some(Arc::clone(&client) as Arc<dyn HttpClient>);
        self.async_client = Some(client);
        self
    }

    /// Appends a plugin; it will run after the plugins added before it.
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn plugins(mut self, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn config(mut self, config: PluginClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_restarts(mut self, max_restarts: usize) -> Self {
        self.config.max_restarts = max_restarts;
        self
    }

    /// # Errors
    ///
    /// Returns [`ClientBuildError::MissingTransport`] when no transport was set.
    pub fn build(self) -> Result<PluginClient, ClientBuildError> {
        let async_client: Arc<dyn HttpAsyncClient> = match (self.async_client, &self.sync_client) {
            (Some(async_client), _) => async_client,
            (None, Some(sync_client)) => Arc::new(EmulatedAsyncClient::new(Arc::clone(sync_client))),
            (None, None) => return Err(ClientBuildError::MissingTransport),
        };

        debug!(
            plugins = self.plugins.len(),
            max_restarts = self.config.max_restarts,
            blocking = self.sync_client.is_some(),
            "plugin client built"
        );

        Ok(PluginClient {
            sync_client: self.sync_client,
            async_client,
            plugins: ArcSwap::from_pointee(self.plugins),
            config: self.config,
        })
    }
}

#[derive(Error, Debug)]
pub enum ClientBuildError {
    #[error("a blocking or non-blocking http client must be set")]
    MissingTransport,
}

/// Decorates an HTTP transport with an ordered list of [`Plugin`]s.
///
/// Every `send`/`send_async` call builds its own [`Chain`] from a snapshot
/// of the plugin list, so changing the list with [`add_plugin`] or
/// [`set_plugins`] affects later calls only.
///
/// [`add_plugin`]: PluginClient::add_plugin
/// [`set_plugins`]: PluginClient::set_plugins
pub struct PluginClient {
    sync_client: Option<Arc<dyn HttpClient>>,
    async_client: Arc<dyn HttpAsyncClient>,
    plugins: ArcSwap<Vec<Arc<dyn Plugin>>>,
    config: PluginClientConfig,
}

impl PluginClient {
    pub fn builder() -> PluginClientBuilder {
        PluginClientBuilder::new()
    }

    pub fn add_plugin<P: Plugin + 'static>(&self, plugin: P) {
        let plugin: Arc<dyn Plugin> = Arc::new(plugin);
        self.plugins.rcu(|plugins| {
            let mut plugins = Vec::clone(plugins);
            plugins.push(Arc::clone(&plugin));
            plugins
        });
    }

    pub fn set_plugins(&self, plugins: Vec<Arc<dyn Plugin>>) {
        self.plugins.store(Arc::new(plugins));
    }

    pub fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        Vec::clone(&self.plugins.load())
    }

    pub fn config(&self) -> &PluginClientConfig {
        &self.config
    }

    /// Sends `request` through the plugins and blocks until it resolves.
    ///
    /// With a blocking transport the chain ends in a direct blocking send,
    /// otherwise this waits on [`send_async`](Self::send_async).
    ///
    /// # Errors
    ///
    /// Returns whatever failure the chain resolved to: a transport error, an
    /// error raised by a plugin, or [`Error::LoopExceeded`].
    pub fn send(&self, request: Request) -> Result<Response, Error> {
        let Some(sync_client) = &self.sync_client else {
            return self.send_async(request).wait();
        };

        let sync_client = Arc::clone(sync_client);
        let chain = self.chain(move |request| Deferred::from_result(sync_client.send(request)));
        chain.call(request).wait()
    }

    /// Sends `request` through the plugins without blocking.
    pub fn send_async(&self, request: Request) -> Deferred {
        let async_client = Arc::clone(&self.async_client);
        let chain = self.chain(move |request| async_client.send_async(request));
        chain.call(request)
    }

    fn chain<T>(&self, terminal: T) -> Chain
    where
        T: Fn(Request) -> Deferred + Send + Sync + 'static,
    {
        let plugins = self.plugins.load_full();
        debug!(plugins = plugins.len(), "building plugin chain");
        Chain::new(plugins, terminal, self.config.max_restarts)
    }
}

impl HttpClient for PluginClient {
    fn send(&self, request: Request) -> Result<Response, Error> {
        PluginClient::send(self, request)
    }
}

impl HttpAsyncClient for PluginClient {
    fn send_async(&self, request: Request) -> Deferred {
        PluginClient::send_async(self, request)
    }
}

impl fmt::Debug for PluginClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins = self.plugins.load();
        let names = plugins.iter().map(|plugin| plugin.name()).collect::<Vec<_>>();
        f.debug_struct("PluginClient")
            .field("plugins", &names)
            .field("config", &self.config)
            .field("blocking", &self.sync_client.is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for PluginClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginClientBuilder")
            .field("plugins", &self.plugins.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{First, Next};
    use crate::plugin::plugin_fn;
    use crate::plugins::ErrorPlugin;
    use bytes::Bytes;
    use http::{HeaderValue, StatusCode, header};
    use micro_client::{DeferredState, async_client_fn, client_fn};
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        pub Transport {}

        impl HttpClient for Transport {
            fn send(&self, request: Request) -> Result<Response, Error>;
        }
    }

    mock! {
        pub DualTransport {}

        impl HttpClient for DualTransport {
            fn send(&self, request: Request) -> Result<Response, Error>;
        }

        impl HttpAsyncClient for DualTransport {
            fn send_async(&self, request: Request) -> Deferred;
        }
    }

    fn request() -> Request {
        http::Request::builder().uri("http://localhost/users/1").body(Bytes::new()).unwrap()
    }

    fn response(status: StatusCode, body: &'static str) -> Response {
        http::Response::builder().status(status).body(Bytes::from_static(body.as_bytes())).unwrap()
    }

    fn counting(name: &'static str, counter: Arc<AtomicUsize>) -> impl Plugin {
        plugin_fn(name, move |request, next: Next, _first| {
            counter.fetch_add(1, Ordering::SeqCst);
            next.call(request)
        })
    }

    fn reauthenticate() -> impl Plugin {
        plugin_fn("reauthenticate", |request: Request, next: Next, first: First| {
            let retry = request.clone();
            next.call(request).then(move |result| match result {
                Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                    let mut retry = retry;
                    retry.headers_mut().insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token"));
                    first.call(retry)
                }
                other => Deferred::from_result(other),
            })
        })
    }

    fn authorized(request: &Request) -> Response {
        if request.headers().contains_key(header::AUTHORIZATION) {
            response(StatusCode::OK, "welcome")
        } else {
            response(StatusCode::UNAUTHORIZED, "")
        }
    }

    #[test]
    fn build_without_transport_fails() {
        let result = PluginClient::builder().plugin(ErrorPlugin::new()).build();

        assert!(matches!(result, Err(ClientBuildError::MissingTransport)));
    }

    #[test]
    fn empty_chain_passes_through_blocking_transport() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| request.uri().path() == "/users/1")
            .times(1)
            .returning(|_| Ok(response(StatusCode::OK, "alice")));
        let client = PluginClient::builder().client(transport).build().unwrap();

        let response = client.send(request()).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &Bytes::from_static(b"alice"));
    }

    #[test]
    fn empty_chain_send_async_emulates_blocking_transport() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| Ok(response(StatusCode::OK, "alice")));
        let client = PluginClient::builder().client(transport).build().unwrap();

        let deferred = client.send_async(request());

        assert_eq!(deferred.state(), DeferredState::Fulfilled);
        assert_eq!(deferred.wait().unwrap().body(), &Bytes::from_static(b"alice"));
    }

    #[test]
    fn send_prefers_blocking_transport_when_both_exist() {
        let mut transport = MockDualTransport::new();
        transport.expect_send().times(1).returning(|_| Ok(response(StatusCode::OK, "blocking")));
        transport.expect_send_async().never();
        let client = PluginClient::builder().full_client(transport).build().unwrap();

        let response = client.send(request()).unwrap();

        assert_eq!(response.body(), &Bytes::from_static(b"blocking"));
    }

    #[tokio::test]
    async fn send_async_uses_non_blocking_transport() {
        let mut transport = MockDualTransport::new();
        transport.expect_send().never();
        transport.expect_send_async().times(1).returning(|_| {
            Deferred::from_future(async {
                tokio::task::yield_now().await;
                Ok(response(StatusCode::OK, "non-blocking"))
            })
        });
        let client = PluginClient::builder().full_client(transport).build().unwrap();

        let deferred = client.send_async(request());
        assert_eq!(deferred.state(), DeferredState::Pending);

        let response = deferred.await.unwrap();
        assert_eq!(response.body(), &Bytes::from_static(b"non-blocking"));
    }

    #[test]
    fn send_on_async_only_transport_matches_waiting_on_send_async() {
        let transport = async_client_fn(|request: Request| async move {
            futures::future::ready(()).await;
            Ok(authorized(&request))
        });
        let client = PluginClient::builder().async_client(transport).plugin(reauthenticate()).build().unwrap();

        let blocking = client.send(request()).unwrap();
        let waited = client.send_async(request()).wait().unwrap();

        assert_eq!(blocking.status(), waited.status());
        assert_eq!(blocking.body(), waited.body());
        assert_eq!(blocking.status(), StatusCode::OK);
    }

    #[test]
    fn transport_failure_reaches_caller() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|request| Err(Error::transport(request, "connection refused")));
        let client = PluginClient::builder().client(transport).plugin(ErrorPlugin::new()).build().unwrap();

        let error = client.send(request()).unwrap_err();

        assert!(error.is_transport());
        assert_eq!(error.to_string(), "transport error: connection refused");
    }

    #[test]
    fn error_plugin_rejects_client_errors_through_send() {
        let client = PluginClient::builder()
            .client(client_fn(|_| Ok(response(StatusCode::NOT_FOUND, ""))))
            .plugin(ErrorPlugin::new())
            .build()
            .unwrap();

        let error = client.send(request()).unwrap_err();

        assert!(error.is_client_error());
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn restart_budget_comes_from_config() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invocations);
        let client = PluginClient::builder()
            .client(client_fn(|_| Ok(response(StatusCode::OK, ""))))
            .plugin(plugin_fn("loop", move |request, _next, first: First| {
                counter.fetch_add(1, Ordering::SeqCst);
                first.call(request)
            }))
            .config(PluginClientConfig::new().with_max_restarts(2))
            .build()
            .unwrap();

        let error = client.send(request()).unwrap_err();

        assert!(error.is_loop_exceeded());
        assert_eq!(invocations.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn restart_counter_is_per_call() {
        let client = PluginClient::builder()
            .client(client_fn(|request| Ok(authorized(&request))))
            .plugin(reauthenticate())
            .max_restarts(1)
            .build()
            .unwrap();

        assert_eq!(client.send(request()).unwrap().status(), StatusCode::OK);
        assert_eq!(client.send(request()).unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn in_flight_call_keeps_its_plugin_snapshot() {
        let transport = async_client_fn(|request: Request| async move {
            tokio::task::yield_now().await;
            Ok(authorized(&request))
        });
        let client = PluginClient::builder().async_client(transport).plugin(reauthenticate()).build().unwrap();
        let late_calls = Arc::new(AtomicUsize::new(0));

        let in_flight = client.send_async(request());
        assert_eq!(in_flight.state(), DeferredState::Pending);
        client.add_plugin(counting("late", Arc::clone(&late_calls)));

        // the restart after the 401 re-enters the chain built before `add_plugin`
        assert_eq!(in_flight.await.unwrap().status(), StatusCode::OK);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        assert_eq!(client.send_async(request()).await.unwrap().status(), StatusCode::OK);
        assert_eq!(late_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn plugin_list_can_be_inspected_and_replaced() {
        let counter = Arc::new(AtomicUsize::new(0));
        let client = PluginClient::builder()
            .client(client_fn(|_| Ok(response(StatusCode::OK, ""))))
            .plugin(counting("first", Arc::clone(&counter)))
            .build()
            .unwrap();
        client.add_plugin(counting("second", Arc::clone(&counter)));

        let names = client.plugins().iter().map(|plugin| plugin.name().to_owned()).collect::<Vec<_>>();
        assert_eq!(names, vec!["first", "second"]);

        client.send(request()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        client.set_plugins(vec![]);
        assert!(client.plugins().is_empty());
        client.send(request()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn plugin_clients_nest() {
        let inner = PluginClient::builder()
            .client(client_fn(|_| Ok(response(StatusCode::SERVICE_UNAVAILABLE, ""))))
            .build()
            .unwrap();
        let outer = PluginClient::builder().full_client(inner).plugin(ErrorPlugin::new()).build().unwrap();

        let error = outer.send(request()).unwrap_err();

        assert!(error.is_server_error());
    }
}
