use std::collections::HashMap;

use async_trait::async_trait;
use models::{OptionRecord, Slug};
use tokio::sync::RwLock;

use super::OptionBackend;
use crate::errors::ServiceError;

/// Process-local backend, used in tests and when no file is configured.
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<HashMap<Slug, OptionRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }

    /// Number of slugs currently holding a record.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl OptionBackend for MemoryBackend {
    async fn read(&self, slug: &Slug) -> Result<Option<OptionRecord>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(slug).cloned())
    }

    async fn write(&self, slug: &Slug, record: OptionRecord) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(slug.clone(), record);
        Ok(())
    }

    async fn delete(&self, slug: &Slug) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(map.remove(slug).is_some())
    }
}
