//! Settings form support: field contracts, section bookkeeping and the page
//! that sanitizes and stores a submission. Nothing here renders markup.

pub mod fields;
pub mod registry;
pub mod settings_page;

pub use fields::{CheckboxField, Field, TextField};
pub use registry::{SectionEntry, SectionRegistrar, SectionRegistry, SettingsRegistry};
pub use settings_page::{SettingsError, SettingsPage, DEFAULT_SECTION};
