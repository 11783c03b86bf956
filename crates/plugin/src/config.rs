use serde::Deserialize;

pub const DEFAULT_MAX_RESTARTS: usize = 10;

/// Options recognized by [`PluginClient`](crate::PluginClient).
///
/// Missing fields take their defaults when deserialized, so `{}` is a valid
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginClientConfig {
    /// How many times a single call may re-enter its chain through `first`.
    pub max_restarts: usize,
}

impl PluginClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }
}

impl Default for PluginClientConfig {
    fn default() -> Self {
        Self { max_restarts: DEFAULT_MAX_RESTARTS }
    }
}
