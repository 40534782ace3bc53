//! Persistent map store.
//!
//! Provides a trait-based store for the root registry with implementations for:
//! - JSON file on local disk
//! - In-memory map (embedding, tests)

mod error;
mod file;
mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{Entries, MapStore};
