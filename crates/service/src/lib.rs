//! HTTP API over the annex image and annotation stores.
//!
//! The thin CRUD endpoints translate HTTP verbs into store adapter calls;
//! the export subsystem ([`export`]) reconciles both stores into a single
//! downloadable ZIP archive.

pub mod config;
pub mod export;
pub mod http_server;
mod state;

pub use config::Config;
pub use state::{State as ServiceState, StateSetupError};
