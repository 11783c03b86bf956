use std::fmt;

use micro_client::{Deferred, Request};

use crate::chain::{First, Next};

/// A unit of interception in a [`PluginClient`](crate::PluginClient) chain.
///
/// `handle` receives the request at this position together with two
/// continuations:
///
/// - `next` runs the rest of the chain after this plugin
/// - `first` re-enters the chain from its start, counting against the
///   restart limit of the call
///
/// A plugin returns a [`Deferred`] by forwarding to either continuation, by
/// transforming what they return, or by answering on its own without
/// forwarding. HTTP level conditions are reported as a rejected deferred,
/// never as a panic.
///
/// One instance is shared by every call of the owning client, possibly from
/// several threads at once, so per-call state belongs in the closures a plugin
/// attaches to the deferred, not in `self`.
pub trait Plugin: Send + Sync {
    fn handle(&self, request: Request, next: Next, first: First) -> Deferred;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// a `Plugin` backed by a closure
pub struct FnPlugin<F> {
    name: String,
    f: F,
}

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(Request, Next, First) -> Deferred + Send + Sync,
{
    fn handle(&self, request: Request, next: Next, first: First) -> Deferred {
        (self.f)(request, next, first)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnPlugin<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPlugin").field("name", &self.name).finish_non_exhaustive()
    }
}

pub fn plugin_fn<F>(name: impl Into<String>, f: F) -> FnPlugin<F>
where
    F: Fn(Request, Next, First) -> Deferred + Send + Sync,
{
    FnPlugin { name: name.into(), f }
}
