//! Composite options: one persisted record exposed as a map of sub-values.
//!
//! - `BoundedOption`: sub-keys fixed to the default set, no create/delete.
//! - `OpenOption`: arbitrary sub-keys, plus bulk merge and pruning.
//! - `Settings`: bounded option whose writes keep keys the incoming value omits.
//!
//! Both variants fall back to their defaults the same way: an absent record is
//! replaced by the full default set, and a partial one is topped up, existing
//! values winning.

use async_trait::async_trait;
use models::{DefaultSet, OptionRecord, Slug};
use serde_json::Value;

use crate::errors::ServiceError;

mod shared;
pub mod bounded;
pub mod open;
pub mod settings;

pub use bounded::BoundedOption;
pub use open::OpenOption;
pub use settings::{Settings, ThemeSettings, THEME_MODS_PREFIX};

/// Supplies the default set of a concrete option.
pub trait Defaults: Send + Sync + 'static {
    fn defaults(&self) -> DefaultSet;
}

impl Defaults for DefaultSet {
    fn defaults(&self) -> DefaultSet { self.clone() }
}

/// Associative-container view over one composite option.
#[async_trait]
pub trait CompositeOption: Send + Sync {
    fn slug(&self) -> &Slug;

    fn defaults(&self) -> DefaultSet;

    fn default_for(&self, key: &str) -> Option<Value> {
        self.defaults().get(key).cloned()
    }

    async fn exists(&self, key: &str) -> Result<bool, ServiceError>;

    async fn get(&self, key: &str) -> Result<Value, ServiceError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), ServiceError>;

    async fn delete(&self, key: &str) -> Result<(), ServiceError>;

    async fn count(&self) -> Result<usize, ServiceError>;

    /// Snapshot of the default-merged record; iterate it as often as needed.
    async fn entries(&self) -> Result<OptionRecord, ServiceError>;
}
