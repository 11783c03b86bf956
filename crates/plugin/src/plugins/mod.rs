//! Ready-made plugins.
//!
//! - [`ErrorPlugin`]: rejects 4xx/5xx responses with typed errors
//! - [`HeaderSetPlugin`]: forces header values on every request
//! - [`LoggerPlugin`]: logs exchanges through `tracing`
//! - [`RedirectPlugin`]: follows redirects by restarting the chain

mod error;
mod header;
mod logger;
mod redirect;

pub use error::ErrorPlugin;
pub use header::HeaderSetPlugin;
pub use logger::LoggerPlugin;
pub use redirect::RedirectPlugin;
