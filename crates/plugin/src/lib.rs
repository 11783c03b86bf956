//! A plugin chain decorator for HTTP clients
//!
//! [`PluginClient`] wraps a transport from [`micro_client`] and runs every
//! request through an ordered list of [`Plugin`]s. A plugin can rewrite the
//! request, answer on its own, inspect or transform the eventual result, or
//! restart the whole chain.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use http::StatusCode;
//! use micro_client::client_fn;
//! use micro_plugin::PluginClient;
//! use micro_plugin::plugins::{ErrorPlugin, LoggerPlugin};
//!
//! let client = PluginClient::builder()
//!     .client(client_fn(|_request| {
//!         Ok(http::Response::builder().status(StatusCode::NOT_FOUND).body(Bytes::new()).unwrap())
//!     }))
//!     .plugin(LoggerPlugin)
//!     .plugin(ErrorPlugin::new())
//!     .build()
//!     .unwrap();
//!
//! let request = http::Request::builder().uri("http://localhost/missing").body(Bytes::new()).unwrap();
//! let error = client.send(request).unwrap_err();
//! assert!(error.is_client_error());
//! ```
//!
//! # Chain Execution
//!
//! Each call snapshots the plugin list and builds a [`Chain`] ending in the
//! transport. The first plugin of the list is the outermost one. Plugins get
//! two continuations:
//!
//! - [`Next`]: the rest of the chain after the current plugin
//! - [`First`]: the start of the chain, used to resend a request through
//!   every plugin again
//!
//! Re-entering through [`First`] is bounded by
//! [`PluginClientConfig::max_restarts`]; a call that restarts more often is
//! rejected with [`Error::LoopExceeded`](micro_client::Error::LoopExceeded).
//!
//! # Blocking and Non-blocking Sends
//!
//! [`PluginClient::send`] blocks and [`PluginClient::send_async`] returns a
//! [`Deferred`](micro_client::Deferred). Both run the same plugins; failures
//! of either kind surface as the rejected result of the chain, never as
//! panics.

mod chain;
mod client;
mod config;
mod plugin;

pub mod plugins;

pub use chain::{Chain, First, Next};
pub use client::{ClientBuildError, PluginClient, PluginClientBuilder};
pub use config::{DEFAULT_MAX_RESTARTS, PluginClientConfig};
pub use plugin::{FnPlugin, Plugin, plugin_fn};
