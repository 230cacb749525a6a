use dashmap::DashMap;

/// Read-only view of the sections and fields registered per settings page.
pub trait SectionRegistry: Send + Sync {
    /// Section names of `page`, in registration order.
    fn sections_for(&self, page: &str) -> Vec<String>;
    /// Field names of `section` on `page`, in registration order.
    fn fields_for(&self, page: &str, section: &str) -> Vec<String>;
}

/// Write side used while a page builds its form.
pub trait SectionRegistrar: Send + Sync {
    fn add_section(&self, page: &str, name: &str, title: &str);
    /// Adds the section on the fly if it is not known yet.
    fn add_field(&self, page: &str, section: &str, name: &str, label: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionEntry {
    pub name: String,
    pub title: String,
    /// `(name, label)` pairs
    pub fields: Vec<(String, String)>,
}

/// In-memory registry of settings sections keyed by page slug.
#[derive(Default)]
pub struct SettingsRegistry {
    pages: DashMap<String, Vec<SectionEntry>>,
}

impl SettingsRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn section(&self, page: &str, name: &str) -> Option<SectionEntry> {
        self.pages.get(page)?.iter().find(|s| s.name == name).cloned()
    }
}

impl SectionRegistry for SettingsRegistry {
    fn sections_for(&self, page: &str) -> Vec<String> {
        self.pages
            .get(page)
            .map(|sections| sections.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    fn fields_for(&self, page: &str, section: &str) -> Vec<String> {
        self.section(page, section)
            .map(|s| s.fields.into_iter().map(|(name, _)| name).collect())
            .unwrap_or_default()
    }
}

impl SectionRegistrar for SettingsRegistry {
    fn add_section(&self, page: &str, name: &str, title: &str) {
        let mut sections = self.pages.entry(page.to_string()).or_default();
        match sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.title = title.to_string(),
            None => sections.push(SectionEntry { name: name.to_string(), title: title.to_string(), fields: Vec::new() }),
        }
    }

    fn add_field(&self, page: &str, section: &str, name: &str, label: &str) {
        let mut sections = self.pages.entry(page.to_string()).or_default();
        let idx = match sections.iter().position(|s| s.name == section) {
            Some(idx) => idx,
            None => {
                sections.push(SectionEntry { name: section.to_string(), title: String::new(), fields: Vec::new() });
                sections.len() - 1
            }
        };
        let fields = &mut sections[idx].fields;
        match fields.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = label.to_string(),
            None => fields.push((name.to_string(), label.to_string())),
        }
    }
}
