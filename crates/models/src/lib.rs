//! Data model for composite options.
//! - `OptionRecord`: one persisted record, sub-key -> value, stored under a slug.
//! - `DefaultSet`: fallback values declared by a concrete store, never persisted.
//! - `Slug` and sub-key validation shared by every layer above.

pub mod errors;
pub mod slug;
pub mod record;
pub mod defaults;

pub use defaults::DefaultSet;
pub use errors::ModelError;
pub use record::OptionRecord;
pub use slug::{validate_sub_key, Slug};
