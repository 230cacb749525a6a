//! Runtime wiring
//!
//! Turns a loaded `AppConfig` into a ready `OptionService`, so binaries and
//! tests depend on `service` alone for startup.

use std::sync::Arc;

use common::utils::logging::{init_logging_compact, init_logging_json};
use configs::{AppConfig, LogFormat, LoggingConfig};
use tracing::info;

use crate::errors::ServiceError;
use crate::hooks::HookRegistry;
use crate::options::OptionService;
use crate::storage;

/// Install the tracing subscriber described by `[logging]`.
pub fn init_logging(cfg: &LoggingConfig) {
    match cfg.format {
        LogFormat::Compact => init_logging_compact(cfg.filter.as_deref()),
        LogFormat::Json => init_logging_json(cfg.filter.as_deref()),
    }
}

/// Open the configured backend and bind it to a fresh hook registry.
pub async fn bootstrap(cfg: &AppConfig) -> Result<Arc<OptionService>, ServiceError> {
    let backend = storage::open(&cfg.storage).await?;
    let svc = Arc::new(OptionService::new(backend, Arc::new(HookRegistry::new())));
    info!(event = "service_ready", backend = ?cfg.storage.backend, "option service ready");
    Ok(svc)
}
