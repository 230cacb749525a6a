//! Composite option storage: many related settings persisted as one record.
//! - `storage` holds whole records per slug (memory or JSON file).
//! - `options` layers default/read/pre-update filters from `hooks` on top.
//! - `composite` exposes a record as a map of sub-values with defaults.
//! - `admin` sanitizes and stores settings form submissions.

pub mod errors;
pub mod storage;
pub mod hooks;
pub mod options;
pub mod composite;
pub mod admin;
pub mod runtime;
