use std::sync::Arc;

use async_trait::async_trait;
use models::{DefaultSet, OptionRecord, Slug};
use serde_json::Value;

use super::{BoundedOption, CompositeOption, Defaults};
use crate::errors::ServiceError;
use crate::hooks::{EventRegistrar, FilterArgs, HookGuard, OptionEvent, DEFAULT_PRIORITY};
use crate::options::OptionService;

/// Slug prefix of the per-theme settings record.
pub const THEME_MODS_PREFIX: &str = "theme_mods_";

/// Bounded option edited through a settings form.
///
/// Every write to the slug, whoever issues it, is merged with the previous
/// value so a form showing only some fields does not wipe the others.
pub struct Settings<D: Defaults> {
    inner: BoundedOption<D>,
    _merge_hook: HookGuard,
}

/// Settings stored in a theme's own `theme_mods_{theme}` record.
pub type ThemeSettings<D> = Settings<D>;

/// Incoming values win per key; keys the incoming record lacks are kept.
pub fn merge_old_settings(new: OptionRecord, old: &OptionRecord) -> OptionRecord {
    new.merged_over(old)
}

impl<D: Defaults> Settings<D> {
    pub fn new(slug: Slug, defaults: D, options: Arc<OptionService>, registrar: Arc<dyn EventRegistrar>) -> Self {
        let merge_hook = HookGuard::register(
            registrar.clone(),
            OptionEvent::PreUpdateOption.hook_name(&slug),
            DEFAULT_PRIORITY,
            Arc::new(|new: OptionRecord, args: &FilterArgs<'_>| match args.previous {
                Some(old) => merge_old_settings(new, old),
                None => new,
            }),
        );
        let inner = BoundedOption::new(slug, defaults, options, registrar);
        Self { inner, _merge_hook: merge_hook }
    }

    pub fn from_service(slug: Slug, defaults: D, options: &Arc<OptionService>) -> Self {
        Self::new(slug, defaults, options.clone(), options.registrar())
    }

    /// Settings for `theme`, stored under `theme_mods_{theme}`.
    pub fn for_theme(
        theme: &str,
        defaults: D,
        options: Arc<OptionService>,
        registrar: Arc<dyn EventRegistrar>,
    ) -> Result<Self, ServiceError> {
        let slug = Slug::new(format!("{THEME_MODS_PREFIX}{theme}"))?;
        Ok(Self::new(slug, defaults, options, registrar))
    }

    pub fn options(&self) -> &Arc<OptionService> { &self.inner.core.options }
}

#[async_trait]
impl<D: Defaults> CompositeOption for Settings<D> {
    fn slug(&self) -> &Slug { self.inner.slug() }

    fn defaults(&self) -> DefaultSet { self.inner.defaults() }

    async fn exists(&self, key: &str) -> Result<bool, ServiceError> { self.inner.exists(key).await }

    async fn get(&self, key: &str) -> Result<Value, ServiceError> { self.inner.get(key).await }

    async fn set(&self, key: &str, value: Value) -> Result<(), ServiceError> { self.inner.set(key, value).await }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> { self.inner.delete(key).await }

    async fn count(&self) -> Result<usize, ServiceError> { self.inner.count().await }

    async fn entries(&self) -> Result<OptionRecord, ServiceError> { self.inner.entries().await }
}
