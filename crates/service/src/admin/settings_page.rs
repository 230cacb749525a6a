use std::sync::Arc;

use models::{validate_sub_key, OptionRecord, Slug};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::fields::Field;
use super::registry::{SectionRegistrar, SectionRegistry};
use crate::composite::CompositeOption;
use crate::errors::ServiceError;
use crate::options::OptionService;

/// Section fields land in until `add_section` is called.
pub const DEFAULT_SECTION: &str = "default";

/// A message reported while sanitizing a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SettingsError {
    pub setting: String,
    pub code: String,
    pub message: String,
}

/// Settings form bound to one composite option.
///
/// Keeps the fields the page shows, runs their sanitizers over a submission
/// and persists the result through the option service, so hooks on the
/// option's slug (such as the `Settings` merge) apply.
pub struct SettingsPage<R> {
    slug: String,
    settings: Arc<dyn CompositeOption>,
    options: Arc<OptionService>,
    registry: Arc<R>,
    current_section: String,
    fields: Vec<(String, Box<dyn Field>)>,
    errors: Vec<SettingsError>,
}

impl<R: SectionRegistry + SectionRegistrar> SettingsPage<R> {
    /// `slug` names the page; the option's slug is used when it is `None`.
    pub fn new(
        settings: Arc<dyn CompositeOption>,
        options: Arc<OptionService>,
        registry: Arc<R>,
        slug: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let slug = match slug {
            Some(s) => Slug::new(s)?.to_string(),
            None => settings.slug().to_string(),
        };
        Ok(Self {
            slug,
            settings,
            options,
            registry,
            current_section: DEFAULT_SECTION.to_string(),
            fields: Vec::new(),
            errors: Vec::new(),
        })
    }

    pub fn slug(&self) -> &str { &self.slug }

    pub fn settings(&self) -> &Arc<dyn CompositeOption> { &self.settings }

    pub fn current_section(&self) -> &str { &self.current_section }

    /// Add a section and make it current. An empty `name` is generated as
    /// `{page}-section{n}`, `n` counting the sections already on the page.
    pub fn add_section(&mut self, title: &str, name: &str) -> String {
        let name = if name.is_empty() {
            format!("{}-section{}", self.slug, self.registry.sections_for(&self.slug).len() + 1)
        } else {
            name.to_string()
        };
        self.registry.add_section(&self.slug, &name, title);
        self.current_section = name.clone();
        name
    }

    /// Add a field to the current section.
    pub fn add_field(&mut self, name: &str, field: Box<dyn Field>) -> Result<(), ServiceError> {
        validate_sub_key(name)?;
        self.registry.add_field(&self.slug, &self.current_section, name, field.label());
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = field,
            None => self.fields.push((name.to_string(), field)),
        }
        Ok(())
    }

    /// Names of all sections known for this page.
    pub fn sections(&self) -> Vec<String> {
        self.registry.sections_for(&self.slug)
    }

    pub fn fields_for_section(&self, section: &str) -> Vec<String> {
        self.registry.fields_for(&self.slug, section)
    }

    pub fn field(&self, name: &str) -> Option<&dyn Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f.as_ref())
    }

    /// Current stored value for a field, as a form would prefill it.
    pub async fn field_value(&self, name: &str) -> Result<Value, ServiceError> {
        self.settings.get(name).await
    }

    pub fn add_error(&mut self, code: &str, message: &str) {
        self.errors.push(SettingsError {
            setting: self.settings.slug().to_string(),
            code: code.to_string(),
            message: message.to_string(),
        });
    }

    /// Errors reported since the page was built.
    pub fn errors(&self) -> &[SettingsError] { &self.errors }

    /// Run every field's sanitizer over `submitted`. Keys without a field pass
    /// through untouched; fields missing from the submission are sanitized from `None`.
    pub fn sanitize_settings(&mut self, mut submitted: OptionRecord) -> OptionRecord {
        let mut reported: Vec<(String, String)> = Vec::new();
        for (name, field) in &self.fields {
            let value = submitted.remove(name);
            let clean = field.sanitize_value(value, &mut |message: String| reported.push((name.clone(), message)));
            submitted.insert(name.clone(), clean);
        }
        for (code, message) in reported {
            warn!(page = %self.slug, code = %code, %message, "setting rejected");
            self.add_error(&code, &message);
        }
        submitted
    }

    /// Sanitize and persist a form submission. Returns whether anything was written.
    #[instrument(skip(self, submitted), fields(page = %self.slug, keys = submitted.len()))]
    pub async fn submit(&mut self, submitted: OptionRecord) -> Result<bool, ServiceError> {
        let clean = self.sanitize_settings(submitted);
        let written = self.options.update_option(self.settings.slug(), clean).await?;
        info!(page = %self.slug, written, event = "settings_submitted", "settings form processed");
        Ok(written)
    }
}
