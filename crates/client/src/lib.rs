//! `brickerp-client`
//!
//! Host process for the local utilities: reads configuration, opens the
//! local store, talks to the remote backend over HTTP, and keeps the offline
//! queue in step with connectivity.

pub mod app;
pub mod config;
pub mod http;
pub mod probe;

#[cfg(test)]
mod test_server;

pub use app::Client;
pub use config::ClientConfig;
pub use http::RestBackend;
pub use probe::HealthProbe;
