use std::sync::Arc;

use async_trait::async_trait;
use models::{DefaultSet, OptionRecord, Slug};
use serde_json::Value;
use tracing::debug;

use super::shared::{check_key, OptionCore};
use super::{CompositeOption, Defaults};
use crate::errors::ServiceError;
use crate::hooks::EventRegistrar;
use crate::options::OptionService;

/// Composite option with a fixed set of sub-keys: those of its defaults.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use models::{DefaultSet, Slug};
/// use serde_json::json;
/// use service::composite::{BoundedOption, CompositeOption};
/// use service::options::OptionService;
/// use service::storage::MemoryBackend;
///
/// let svc = Arc::new(OptionService::with_backend(Arc::new(MemoryBackend::new())));
/// let defaults = DefaultSet::new().with("color", json!("blue"));
/// let opt = BoundedOption::from_service(Slug::new("my_theme").unwrap(), defaults, &svc);
///
/// tokio_test::block_on(async {
///     assert_eq!(opt.get("color").await.unwrap(), json!("blue"));
///     opt.set("color", json!("red")).await.unwrap();
///     assert_eq!(opt.get("color").await.unwrap(), json!("red"));
///     assert!(opt.set("size", json!(3)).await.is_err());
/// });
/// ```
pub struct BoundedOption<D: Defaults> {
    pub(crate) core: OptionCore<D>,
}

impl<D: Defaults> BoundedOption<D> {
    pub fn new(slug: Slug, defaults: D, options: Arc<OptionService>, registrar: Arc<dyn EventRegistrar>) -> Self {
        Self { core: OptionCore::new(slug, defaults, options, registrar) }
    }

    /// Register against the service's own hook registry.
    pub fn from_service(slug: Slug, defaults: D, options: &Arc<OptionService>) -> Self {
        Self::new(slug, defaults, options.clone(), options.registrar())
    }
}

#[async_trait]
impl<D: Defaults> CompositeOption for BoundedOption<D> {
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
        if !record.contains_key(key) {
            return Err(ServiceError::no_setting(key));
        }
        record.insert(key, value);
        let written = self.core.persist(record).await?;
        debug!(slug = %self.core.slug, key, written, "bounded setting stored");
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), ServiceError> {
        Err(ServiceError::NotSupported("settings of a bounded option cannot be removed"))
    }

    async fn count(&self) -> Result<usize, ServiceError> {
        Ok(self.core.defaults.defaults().len())
    }

    async fn entries(&self) -> Result<OptionRecord, ServiceError> {
        self.core.load().await
    }
}
