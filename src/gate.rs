//! Lifecycle gate.
//!
//! Requests must not be resolved before the persisted registry has been
//! loaded. The gate moves `Installed -> Loading -> Ready` exactly once;
//! activation starts the load and the control worker opens the gate once
//! the load attempt has finished.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Accepting work, nothing loaded yet.
    Installed,
    /// Activated; the registry load is running.
    Loading,
    /// Registry loaded; requests resolve.
    Ready,
}

/// Lifecycle events delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Installation; needs no registry access.
    Install,
    /// Activation; starts the registry load.
    Activate,
}

#[derive(Debug, Clone)]
pub struct Gate {
    phase: Arc<watch::Sender<Phase>>,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Phase::Installed);
        Self {
            phase: Arc::new(tx),
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Start loading. Returns false if the gate was already activated.
    pub fn activate(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == Phase::Installed {
                *phase = Phase::Loading;
                true
            } else {
                false
            }
        })
    }

    /// Mark the registry as loaded and release waiting requests.
    pub(crate) fn open(&self) {
        self.phase.send_replace(Phase::Ready);
    }

    /// Wait until [`Gate::activate`] has been called.
    pub async fn activated(&self) {
        let mut rx = self.phase.subscribe();
        let _ = rx.wait_for(|phase| *phase != Phase::Installed).await;
    }

    /// Wait until the registry has been loaded.
    pub async fn ready(&self) {
        let mut rx = self.phase.subscribe();
        let _ = rx.wait_for(|phase| *phase == Phase::Ready).await;
    }
}
