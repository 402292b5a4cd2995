use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var("HAWKEYE_LOG_LEVEL") {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize diagnostic logging once per process.
///
/// Logs go to stderr so stdout stays reserved for script output.
/// - `HAWKEYE_LOG_LEVEL`: level/filter override (`info`, `hawkeye_common=debug`, ...).
/// - `RUST_LOG`: fallback filter. Default is `warn`.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_env_filter(resolve_env_filter())
            .with_writer(std::io::stderr)
            .try_init();
    });
}
