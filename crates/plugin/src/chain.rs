//! Call-scoped plugin chains.
//!
//! A [`Chain`] is built for every call from a snapshot of the plugin list and
//! a terminal call that performs the actual transport send. Invoking it is
//! equivalent to the nested application
//!
//! ```text
//! P1.handle(req, |r| P2.handle(r, |r| ... terminal(r) ..., first), first)
//! ```
//!
//! so the first plugin of the list sees the request first and the last one sits
//! right before the transport.
//!
//! Each [`Next`] is a position in the chain and each [`First`] a handle to the
//! chain's guarded entry point. Both only hold the chain itself, so the entry
//! point every plugin receives is the fully built one, and the restart
//! counter is owned by the call that created the chain.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use micro_client::{Deferred, Error, Request};
use tracing::warn;

use crate::plugin::Plugin;

type Terminal = dyn Fn(Request) -> Deferred + Send + Sync;

struct ChainState {
    plugins: Arc<Vec<Arc<dyn Plugin>>>,
    terminal: Box<Terminal>,
    max_restarts: usize,
    entries: AtomicUsize,
}

/// A plugin chain ending in a terminal transport call.
#[derive(Clone)]
pub struct Chain {
    state: Arc<ChainState>,
}

impl Chain {
    pub fn new<T>(plugins: impl Into<Arc<Vec<Arc<dyn Plugin>>>>, terminal: T, max_restarts: usize) -> Self
    where
        T: Fn(Request) -> Deferred + Send + Sync + 'static,
    {
        let state = ChainState {
            plugins: plugins.into(),
            terminal: Box::new(terminal),
            max_restarts,
            entries: AtomicUsize::new(0),
        };
        Self { state: Arc::new(state) }
    }

    /// Runs `request` through the chain from its guarded entry point.
    pub fn call(&self, request: Request) -> Deferred {
        self.first().call(request)
    }

    pub fn first(&self) -> First {
        First { state: Arc::clone(&self.state) }
    }

    /// How many times the entry point was invoked, the initial call included.
    pub fn entries(&self) -> usize {
        self.state.entries.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.state.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.plugins.is_empty()
    }
}

/// The rest of the chain after the plugin that received it.
#[derive(Clone)]
pub struct Next {
    state: Arc<ChainState>,
    position: usize,
}

impl Next {
    pub fn call(&self, request: Request) -> Deferred {
        match self.state.plugins.get(self.position) {
            Some(plugin) => {
                let next = Next { state: Arc::clone(&self.state), position: self.position + 1 };
                let first = First { state: Arc::clone(&self.state) };
                plugin.handle(request, next, first)
            }
            None => (self.state.terminal)(request),
        }
    }
}

/// The guarded entry point of the chain.
///
/// Every invocation counts as an entry; once the count exceeds the configured
/// number of restarts, the call is rejected with [`Error::LoopExceeded`]
/// without reaching any plugin.
#[derive(Clone)]
pub struct First {
    state: Arc<ChainState>,
}

impl First {
    pub fn call(&self, request: Request) -> Deferred {
        let entered = self.state.entries.fetch_add(1, Ordering::SeqCst);
        if entered > self.state.max_restarts {
            warn!(
                max_restarts = self.state.max_restarts,
                method = %request.method(),
                uri = %request.uri(),
                "too many restarts in plugin chain"
            );
            return Deferred::rejected(Error::loop_exceeded(self.state.max_restarts, request));
        }

        Next { state: Arc::clone(&self.state), position: 0 }.call(request)
    }
}

impl fmt::Debug for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins = self.plugins.iter().map(|plugin| plugin.name()).collect::<Vec<_>>();
        f.debug_struct("ChainState")
            .field("plugins", &plugins)
            .field("max_restarts", &self.max_restarts)
            .field("entries", &self.entries.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("state", &self.state).finish()
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("position", &self.position).finish_non_exhaustive()
    }
}

impl fmt::Debug for First {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("First").field("entries", &self.state.entries.load(Ordering::SeqCst)).finish_non_exhaustive()
    }
}
