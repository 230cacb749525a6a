//! Option service: whole-record access to the backend with hook dispatch.
//!
//! This is the layer composite stores talk to. It resolves absent records
//! through `default_option_*` filters, passes present ones through
//! `option_*`, and lets `pre_update_option_*` filters shape every write.

use std::sync::Arc;

use models::{OptionRecord, Slug};
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::hooks::{EventRegistrar, FilterArgs, HookDispatcher, HookRegistry, OptionEvent};
use crate::storage::OptionBackend;

pub struct OptionService {
    backend: Arc<dyn OptionBackend>,
    hooks: Arc<HookRegistry>,
}

impl OptionService {
    pub fn new(backend: Arc<dyn OptionBackend>, hooks: Arc<HookRegistry>) -> Self {
        Self { backend, hooks }
    }

    /// Service with a fresh, empty hook registry.
    pub fn with_backend(backend: Arc<dyn OptionBackend>) -> Self {
        Self::new(backend, Arc::new(HookRegistry::new()))
    }

    /// Registration capability to hand to store constructors.
    pub fn registrar(&self) -> Arc<dyn EventRegistrar> {
        self.hooks.clone()
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> { &self.hooks }

    pub fn backend(&self) -> &Arc<dyn OptionBackend> { &self.backend }

    /// Read a record as callers should see it.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::Slug;
    /// use service::options::OptionService;
    /// use service::storage::MemoryBackend;
    /// let svc = OptionService::with_backend(Arc::new(MemoryBackend::new()));
    /// let slug = Slug::new("unset").unwrap();
    /// assert!(tokio_test::block_on(svc.get_option(&slug)).unwrap().is_none());
    /// ```
    #[instrument(skip(self, slug), fields(slug = %slug))]
    pub async fn get_option(&self, slug: &Slug) -> Result<Option<OptionRecord>, ServiceError> {
        let args = FilterArgs { slug, previous: None };
        match self.backend.read(slug).await? {
            Some(record) => {
                let event = OptionEvent::ReadOption.hook_name(slug);
                Ok(Some(self.hooks.apply(&event, record, &args)))
            }
            None => {
                let event = OptionEvent::DefaultOption.hook_name(slug);
                if !self.hooks.has_filters(&event) {
                    debug!("option absent, no default filter");
                    return Ok(None);
                }
                debug!("option absent, substituting defaults");
                Ok(Some(self.hooks.apply(&event, OptionRecord::new(), &args)))
            }
        }
    }

    /// Write a whole record. Returns `false` when the filtered value equals
    /// the previous one and nothing was written.
    #[instrument(skip(self, slug, record), fields(slug = %slug, keys = record.len()))]
    pub async fn update_option(&self, slug: &Slug, record: OptionRecord) -> Result<bool, ServiceError> {
        let previous = self.get_option(slug).await?;
        let event = OptionEvent::PreUpdateOption.hook_name(slug);
        let args = FilterArgs { slug, previous: previous.as_ref() };
        let value = self.hooks.apply(&event, record, &args);

        if previous.as_ref() == Some(&value) {
            debug!("option unchanged, write skipped");
            return Ok(false);
        }
        self.backend.write(slug, value).await?;
        info!(slug = %slug, event = "option_updated", "option written");
        Ok(true)
    }

    /// Remove the whole record; returns whether one was stored.
    #[instrument(skip(self, slug), fields(slug = %slug))]
    pub async fn delete_option(&self, slug: &Slug) -> Result<bool, ServiceError> {
        let existed = self.backend.delete(slug).await?;
        if existed {
            info!(slug = %slug, event = "option_deleted", "option removed");
        }
        Ok(existed)
    }
}
