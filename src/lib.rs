//! Local web server.
//!
//! Serves registered virtual path prefixes from ordered lists of storage
//! roots, as if the files came from a path-based web server. Requests under a
//! prefix are resolved root by root (first hit wins); directory requests fall
//! back to index files. The prefix-to-roots map is changed only through the
//! serialized control channel and persisted after every change.
//!
//! The engine ([`Lws`]) is host-agnostic; [`routes::app`] hosts it behind an
//! axum router.

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod mime;
pub mod registry;
pub mod resolver;
pub mod root;
pub mod router;
pub mod routes;
pub mod store;

use std::sync::Arc;

pub use config::Config;
pub use control::{Command, ControlChannel, ControlError};
pub use engine::Lws;
pub use error::LwsError;
pub use gate::{LifecycleEvent, Phase};
pub use root::RootHandle;
pub use router::{FileResponse, Interception};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Running engine
    pub lws: Lws,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(lws: Lws, config: Config) -> Self {
        Self {
            lws,
            config: Arc::new(config),
        }
    }
}
