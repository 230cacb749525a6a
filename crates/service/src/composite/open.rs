use std::sync::Arc;

use async_trait::async_trait;
use models::{DefaultSet, OptionRecord, Slug};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::shared::{check_key, OptionCore};
use super::{CompositeOption, Defaults};
use crate::errors::ServiceError;
use crate::hooks::EventRegistrar;
use crate::options::OptionService;

/// Composite option accepting any sub-key; defaults only top up what is read.
pub struct OpenOption<D: Defaults> {
    core: OptionCore<D>,
}

impl<D: Defaults> OpenOption<D> {
    pub fn new(slug: Slug, defaults: D, options: Arc<OptionService>, registrar: Arc<dyn EventRegistrar>) -> Self {
        Self { core: OptionCore::new(slug, defaults, options, registrar) }
    }

    /// Register against the service's own hook registry.
    pub fn from_service(slug: Slug, defaults: D, options: &Arc<OptionService>) -> Self {
        Self::new(slug, defaults, options.clone(), options.registrar())
    }

    /// Bulk import: union `partial` with the current record.
    ///
    /// With `overwrite`, values from `partial` win; otherwise current values
    /// win. An empty `partial` returns `false` without touching storage.
    #[instrument(skip(self, partial), fields(slug = %self.core.slug, keys = partial.len()))]
    pub async fn merge(&self, partial: OptionRecord, overwrite: bool) -> Result<bool, ServiceError> {
        if partial.is_empty() {
            return Ok(false);
        }
        for key in partial.keys() {
            check_key(key)?;
        }
        let current = self.core.load().await?;
        let merged = if overwrite { partial.merged_over(&current) } else { current.merged_over(&partial) };
        self.core.persist(merged).await
    }

    /// Drop stored keys that are unknown to the defaults or equal to their default.
    ///
    /// Returns `false` when the stored record was already minimal (or absent).
    #[instrument(skip(self), fields(slug = %self.core.slug))]
    pub async fn clear_non_default(&self) -> Result<bool, ServiceError> {
        let Some(stored) = self.core.options.backend().read(&self.core.slug).await? else {
            return Ok(false);
        };
        let defaults = self.core.defaults.defaults();
        let mut pruned = stored.clone();
        pruned.retain(|k, v| defaults.contains_key(k) && !defaults.is_default(k, v));
        if pruned == stored {
            return Ok(false);
        }
        let removed = stored.len() - pruned.len();
        let written = self.core.persist(pruned).await?;
        info!(slug = %self.core.slug, removed, event = "option_pruned", "non-default settings cleared");
        Ok(written)
    }

    /// Delete the whole record; later reads fall back to the defaults.
    pub async fn clear(&self) -> Result<bool, ServiceError> {
        self.core.options.delete_option(&self.core.slug).await
    }
}

#[async_trait]
impl<D: Defaults> CompositeOption for OpenOption<D> {
    fn slug(&self) -> &Slug { &self.core.slug }

    fn defaults(&self) -> DefaultSet { self.core.defaults.defaults() }

    async fn exists(&self, key: &str) -> Result<bool, ServiceError> {
        check_key(key)?;
        Ok(self.core.load().await?.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Value, ServiceError> {
        check_key(key)?;
        let mut record = self.core.load().await?;
        record.remove(key).ok_or_else(|| ServiceError::no_setting(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ServiceError> {
        check_key(key)?;
        let mut record = self.core.load().await?;
        record.insert(key, value);
        self.core.persist(record).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        check_key(key)?;
        let mut record = self.core.load().await?;
        if record.remove(key).is_none() {
            debug!(slug = %self.core.slug, key, "delete of unset key");
        }
        self.core.persist(record).await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, ServiceError> {
        Ok(self.core.load().await?.len())
    }

    async fn entries(&self) -> Result<OptionRecord, ServiceError> {
        self.core.load().await
    }
}
