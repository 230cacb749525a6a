//! Hook registry: named filter chains over option records.
//!
//! Stores register filters for their slug's lifecycle events through the
//! `EventRegistrar` capability; `OptionService` runs them through
//! `HookDispatcher`. `HookRegistry` provides both.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use models::{OptionRecord, Slug};
use tracing::trace;

/// Priority used when a caller has no preference. Lower runs first.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Lifecycle events raised for one slug.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionEvent {
    /// Record read and found absent; filters build the substitute.
    DefaultOption,
    /// Record read and found present; filters may transform it.
    ReadOption,
    /// Record about to be written; filters see the previous value too.
    PreUpdateOption,
}

impl OptionEvent {
    /// Event name as registered, e.g. `pre_update_option_my_plugin`.
    pub fn hook_name(self, slug: &Slug) -> String {
        let prefix = match self {
            OptionEvent::DefaultOption => "default_option_",
            OptionEvent::ReadOption => "option_",
            OptionEvent::PreUpdateOption => "pre_update_option_",
        };
        format!("{prefix}{slug}")
    }
}

/// Context handed to every filter in a chain.
#[derive(Clone, Copy, Debug)]
pub struct FilterArgs<'a> {
    pub slug: &'a Slug,
    /// Previously stored value; only set for `PreUpdateOption`.
    pub previous: Option<&'a OptionRecord>,
}

pub type Filter = Arc<dyn Fn(OptionRecord, &FilterArgs<'_>) -> OptionRecord + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

/// Registration side of the hook system.
pub trait EventRegistrar: Send + Sync {
    fn on(&self, event: &str, priority: i32, filter: Filter) -> HookId;
    /// Returns whether a filter with `id` was registered under `event`.
    fn off(&self, event: &str, id: HookId) -> bool;
    fn has(&self, event: &str) -> bool;
}

/// Dispatch side of the hook system.
pub trait HookDispatcher: Send + Sync {
    /// Thread `value` through every filter of `event`; identity when none exist.
    fn apply(&self, event: &str, value: OptionRecord, args: &FilterArgs<'_>) -> OptionRecord;
    fn has_filters(&self, event: &str) -> bool;
}

struct Entry {
    priority: i32,
    id: HookId,
    filter: Filter,
}

/// In-process registry keyed by event name.
#[derive(Default)]
pub struct HookRegistry {
    events: DashMap<String, Vec<Entry>>,
    next_id: AtomicU64,
}

impl HookRegistry {
    pub fn new() -> Self { Self::default() }

    /// Number of filters registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.events.get(event).map(|chain| chain.len()).unwrap_or(0)
    }
}

impl EventRegistrar for HookRegistry {
    fn on(&self, event: &str, priority: i32, filter: Filter) -> HookId {
        let id = HookId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut chain = self.events.entry(event.to_string()).or_default();
        // ids grow monotonically, so (priority, id) keeps ties in registration order
        let pos = chain.partition_point(|e| (e.priority, e.id) <= (priority, id));
        chain.insert(pos, Entry { priority, id, filter });
        trace!(event, priority, hook_id = id.0, "hook registered");
        id
    }

    fn off(&self, event: &str, id: HookId) -> bool {
        let removed = match self.events.get_mut(event) {
            Some(mut chain) => {
                let before = chain.len();
                chain.retain(|e| e.id != id);
                chain.len() != before
            }
            None => false,
        };
        self.events.remove_if(event, |_, chain| chain.is_empty());
        if removed {
            trace!(event, hook_id = id.0, "hook removed");
        }
        removed
    }

    fn has(&self, event: &str) -> bool {
        self.count(event) > 0
    }
}

impl HookDispatcher for HookRegistry {
    fn apply(&self, event: &str, value: OptionRecord, args: &FilterArgs<'_>) -> OptionRecord {
        // clone the chain out so filters may (un)register hooks without deadlocking
        let filters: Vec<Filter> = match self.events.get(event) {
            Some(chain) => chain.iter().map(|e| e.filter.clone()).collect(),
            None => return value,
        };
        filters.iter().fold(value, |acc, f| f(acc, args))
    }

    fn has_filters(&self, event: &str) -> bool {
        self.has(event)
    }
}

/// Keeps one registration alive; dropping it unregisters the filter.
pub struct HookGuard {
    registrar: Arc<dyn EventRegistrar>,
    event: String,
    id: HookId,
}

impl HookGuard {
    /// Register `filter` and tie its lifetime to the returned guard.
    pub fn register(registrar: Arc<dyn EventRegistrar>, event: String, priority: i32, filter: Filter) -> Self {
        let id = registrar.on(&event, priority, filter);
        Self { registrar, event, id }
    }

    pub fn event(&self) -> &str { &self.event }

    pub fn id(&self) -> HookId { self.id }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        self.registrar.off(&self.event, self.id);
    }
}

impl std::fmt::Debug for HookGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookGuard").field("event", &self.event).field("id", &self.id).finish()
    }
}
