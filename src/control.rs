//! Control channel: serialized registry mutation and persistence.
//!
//! Commands go through an unbounded queue to a single worker task. The worker
//! first loads the persisted registry (after activation), then applies
//! commands one at a time in arrival order: mutate the in-memory registry,
//! then save the whole map. The next command is not touched until the previous
//! save has finished, so saves never overlap.
//!
//! If the load fails the worker keeps applying commands in memory but does
//! not save until a later load succeeds; the stored map is never replaced by
//! one built on an empty registry. Persisted values this build cannot decode
//! are carried along and written back with every save.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::gate::Gate;
use crate::registry::{RootRegistry, decode_entries};
use crate::root::RootHandle;
use crate::store::{Entries, MapStore, StoreError};

/// Registry mutation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Bind `prefix` to `roots`, in priority order.
    SetRoots {
        prefix: String,
        roots: Vec<RootHandle>,
    },
    /// Remove every prefix.
    ClearRoots,
    /// Bind `path` to a single root.
    StoreRoot { path: String, handle: RootHandle },
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control channel is closed")]
    Closed,

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

struct Envelope {
    command: Command,
    reply: Option<oneshot::Sender<Result<(), StoreError>>>,
}

/// Sending half of the control channel.
#[derive(Debug, Clone)]
pub struct ControlChannel {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ControlChannel {
    /// Queue a command without waiting for it to be applied.
    pub fn send(&self, command: Command) -> Result<(), ControlError> {
        self.tx
            .send(Envelope {
                command,
                reply: None,
            })
            .map_err(|_| ControlError::Closed)
    }

    /// Queue a command and wait until it has been applied and persisted.
    ///
    /// A persistence failure is returned as [`ControlError::Persistence`]; the
    /// in-memory registry keeps the mutation either way.
    pub async fn apply(&self, command: Command) -> Result<(), ControlError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                command,
                reply: Some(reply),
            })
            .map_err(|_| ControlError::Closed)?;

        rx.await.map_err(|_| ControlError::Closed)??;
        Ok(())
    }
}

/// Single writer of the registry and the store.
pub(crate) struct ControlWorker {
    rx: mpsc::UnboundedReceiver<Envelope>,
    registry: RootRegistry,
    store: Arc<dyn MapStore>,
    gate: Gate,
    /// Whether the registry was built from a successful load.
    loaded: bool,
    /// Persisted entries that did not decode, keyed by prefix.
    retained: Entries,
}

impl ControlWorker {
    pub(crate) fn new(
        registry: RootRegistry,
        store: Arc<dyn MapStore>,
        gate: Gate,
    ) -> (ControlChannel, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            rx,
            registry,
            store,
            gate,
            loaded: false,
            retained: Entries::new(),
        };
        (ControlChannel { tx }, worker)
    }

    pub(crate) async fn run(mut self) {
        self.gate.activated().await;
        self.load().await;
        self.gate.open();

        while let Some(envelope) = self.rx.recv().await {
            let result = self.apply(envelope.command).await;
            if let Some(reply) = envelope.reply {
                let _ = reply.send(result);
            }
        }

        debug!("Control channel closed");
    }

    /// Replace the registry with the persisted map.
    ///
    /// On failure the registry stays empty and saving is suspended; the gate
    /// is opened regardless.
    async fn load(&mut self) {
        match self.store.load().await {
            Ok(entries) => {
                let (roots, retained) = decode_entries(entries);
                info!(
                    "Loaded {} prefixes from store ({} kept undecoded)",
                    roots.len(),
                    retained.len()
                );
                self.registry.replace(roots).await;
                self.retained = retained;
                self.loaded = true;
            }
            Err(e) => error!("Failed to load root map, saving is suspended: {}", e),
        }
    }

    async fn apply(&mut self, command: Command) -> Result<(), StoreError> {
        match command {
            Command::SetRoots { prefix, roots } => {
                info!("Setting {} roots for {}", roots.len(), prefix);
                self.retained.remove(&prefix);
                self.registry.set(prefix, roots).await;
            }
            Command::StoreRoot { path, handle } => {
                info!("Setting root {} for {}", handle, path);
                self.retained.remove(&path);
                self.registry.set(path, vec![handle]).await;
            }
            Command::ClearRoots => {
                info!("Clearing all roots");
                self.retained.clear();
                self.registry.clear().await;
            }
        }

        let result = self.persist().await;
        if let Err(e) = &result {
            error!("Failed to persist root map: {}", e);
        }
        result
    }

    async fn persist(&self) -> Result<(), StoreError> {
        if !self.loaded {
            return Err(StoreError::NotLoaded);
        }

        let mut entries = self.registry.snapshot().await.to_entries()?;
        for (prefix, value) in &self.retained {
            entries
                .entry(prefix.clone())
                .or_insert_with(|| value.clone());
        }
        self.store.save(&entries).await
    }
}
