use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,service=info";

fn env_filter(fallback: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback.unwrap_or(DEFAULT_FILTER)))
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,service=info`
/// - Safe to call more than once; later calls are ignored
pub fn init_logging_default() {
    init_logging_compact(None);
}

/// Compact human-readable output with an optional fallback filter directive.
pub fn init_logging_compact(filter: Option<&str>) {
    let _ = fmt()
        .with_env_filter(env_filter(filter))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, otherwise `filter`, otherwise the default
/// - Emits one JSON object per event, `slug`/`key` fields included
pub fn init_logging_json(filter: Option<&str>) {
    // 默认 info；store 的读写细节在 debug 级别，可用 RUST_LOG=service=debug 打开
    let _ = fmt()
        .with_env_filter(env_filter(filter))
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}
