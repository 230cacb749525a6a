use std::sync::Arc;

use models::{validate_sub_key, OptionRecord, Slug};

use super::Defaults;
use crate::errors::ServiceError;
use crate::hooks::{EventRegistrar, FilterArgs, HookGuard, OptionEvent, DEFAULT_PRIORITY};
use crate::options::OptionService;

/// Slug, defaults and live hook registrations shared by both store variants.
pub(crate) struct OptionCore<D: Defaults> {
    pub(crate) slug: Slug,
    pub(crate) defaults: Arc<D>,
    pub(crate) options: Arc<OptionService>,
    _hooks: Vec<HookGuard>,
}

impl<D: Defaults> OptionCore<D> {
    pub(crate) fn new(slug: Slug, defaults: D, options: Arc<OptionService>, registrar: Arc<dyn EventRegistrar>) -> Self {
        let defaults = Arc::new(defaults);

        let d = defaults.clone();
        let substitute = HookGuard::register(
            registrar.clone(),
            OptionEvent::DefaultOption.hook_name(&slug),
            DEFAULT_PRIORITY,
            Arc::new(move |_: OptionRecord, _: &FilterArgs<'_>| d.defaults().to_record()),
        );

        let d = defaults.clone();
        let top_up = HookGuard::register(
            registrar.clone(),
            OptionEvent::ReadOption.hook_name(&slug),
            DEFAULT_PRIORITY,
            Arc::new(move |mut record: OptionRecord, _: &FilterArgs<'_>| {
                record.fill_missing_from(&d.defaults());
                record
            }),
        );

        Self { slug, defaults, options, _hooks: vec![substitute, top_up] }
    }

    /// Default-merged record; empty when every hook has been removed and nothing is stored.
    pub(crate) async fn load(&self) -> Result<OptionRecord, ServiceError> {
        Ok(self.options.get_option(&self.slug).await?.unwrap_or_default())
    }

    pub(crate) async fn persist(&self, record: OptionRecord) -> Result<bool, ServiceError> {
        self.options.update_option(&self.slug, record).await
    }
}

pub(crate) fn check_key(key: &str) -> Result<(), ServiceError> {
    validate_sub_key(key)?;
    Ok(())
}
