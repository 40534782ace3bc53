//! Engine handle tying registry, control channel, gate and router together.

use std::sync::Arc;

use tracing::debug;

use crate::control::{ControlChannel, ControlWorker};
use crate::gate::{Gate, LifecycleEvent, Phase};
use crate::registry::{RootRegistry, Snapshot};
use crate::resolver::FileResolver;
use crate::router::{Interception, RequestRouter};
use crate::store::MapStore;

/// Running engine.
///
/// Cheap to clone; all clones share one registry and one control worker.
/// The worker stops once every clone has been dropped.
#[derive(Debug, Clone)]
pub struct Lws {
    registry: RootRegistry,
    control: ControlChannel,
    gate: Gate,
    router: RequestRouter,
}

impl Lws {
    /// Start the engine on the current Tokio runtime.
    ///
    /// Commands and requests are accepted right away but wait for
    /// [`LifecycleEvent::Activate`], which loads the registry from `store`.
    pub fn start(store: Arc<dyn MapStore>, index_files: Vec<String>) -> Self {
        let registry = RootRegistry::new();
        let gate = Gate::new();
        let (control, worker) = ControlWorker::new(registry.clone(), store, gate.clone());
        tokio::spawn(worker.run());

        let router = RequestRouter::new(
            registry.clone(),
            gate.clone(),
            FileResolver::new(index_files),
        );

        Self {
            registry,
            control,
            gate,
            router,
        }
    }

    pub fn handle_lifecycle(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Install => debug!("Installed"),
            LifecycleEvent::Activate => {
                if self.gate.activate() {
                    debug!("Activated, loading root map");
                }
            }
        }
    }

    pub fn control(&self) -> &ControlChannel {
        &self.control
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    /// Wait until the persisted registry has been loaded.
    pub async fn ready(&self) {
        self.gate.ready().await;
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.registry.snapshot().await
    }

    /// Decide how to answer a request for `path`.
    pub async fn handle_request(&self, path: &str) -> Interception {
        self.router.route(path).await
    }
}
