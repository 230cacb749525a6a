//! Persistence backends for composite options.
//!
//! A backend stores one opaque `OptionRecord` per slug. It knows nothing about
//! defaults or hooks; those are layered on top by `OptionService`.

use std::sync::Arc;

use async_trait::async_trait;
use configs::{StorageBackend, StorageConfig};
use models::{OptionRecord, Slug};
use tracing::info;

use crate::errors::ServiceError;

pub mod memory;
pub mod json_file;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

/// Trait abstraction for whole-record option persistence.
/// Implementations can be in-memory, file-backed, database-backed, or remote KV.
#[async_trait]
pub trait OptionBackend: Send + Sync {
    async fn read(&self, slug: &Slug) -> Result<Option<OptionRecord>, ServiceError>;
    async fn write(&self, slug: &Slug, record: OptionRecord) -> Result<(), ServiceError>;
    /// Remove the whole record; returns whether one existed.
    async fn delete(&self, slug: &Slug) -> Result<bool, ServiceError>;
}

/// Build the backend selected in `[storage]`.
pub async fn open(cfg: &StorageConfig) -> Result<Arc<dyn OptionBackend>, ServiceError> {
    match cfg.backend {
        StorageBackend::Memory => {
            info!(event = "storage_open", backend = "memory", "using in-memory option storage");
            Ok(Arc::new(MemoryBackend::default()))
        }
        StorageBackend::JsonFile => {
            info!(event = "storage_open", backend = "json_file", path = %cfg.path, "using JSON file option storage");
            let backend: Arc<dyn OptionBackend> = JsonFileBackend::open(&cfg.path).await?;
            Ok(backend)
        }
    }
}
