use std::io;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Handle for adjusting the log filter after the subscriber is installed
pub struct LoggerHandle {
    reload: reload::Handle<EnvFilter, Registry>,
    // RUST_LOG, when present, is never overridden
    env_override: bool,
}

impl LoggerHandle {
    /// Switch to `level` unless RUST_LOG pinned the filter
    pub fn set_level(&self, level: &str) {
        if self.env_override {
            return;
        }
        match EnvFilter::try_new(level) {
            Ok(filter) => {
                if let Err(e) = self.reload.reload(filter) {
                    tracing::warn!("Could not apply log level {}: {}", level, e);
                }
            }
            Err(e) => tracing::warn!("Ignoring invalid log level {:?}: {}", level, e),
        }
    }

    /// The active filter directives
    pub fn current_level(&self) -> Option<String> {
        self.reload.with_current(|filter| filter.to_string()).ok()
    }
}

fn reloadable(
    filter: EnvFilter,
    env_override: bool,
) -> (reload::Layer<EnvFilter, Registry>, LoggerHandle) {
    let (layer, reload) = reload::Layer::new(filter);
    (
        layer,
        LoggerHandle {
            reload,
            env_override,
        },
    )
}

/// Initialize the logging system
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used until the
/// returned handle applies another one. Logs go to stderr so they never
/// interleave with the streamed response on stdout.
pub fn init_logger(default_level: &str) -> LoggerHandle {
    let (filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (
            EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("error")),
            false,
        ),
    };
    let (filter_layer, handle) = reloadable(filter, env_override);

    // A second init (e.g. from tests) is harmless, so ignore the error.
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .try_init();

    handle
}

/// Resolve the effective log level from config and the verbose flag
pub fn effective_level(configured: &str, verbose: bool) -> String {
    if verbose {
        "info".to_string()
    } else {
        configured.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level("error", false), "error");
        assert_eq!(effective_level("error", true), "info");
        assert_eq!(effective_level("debug", false), "debug");
    }

    #[test]
    fn test_configured_level_replaces_startup_level() {
        let (layer, handle) = reloadable(EnvFilter::new("error"), false);
        let _subscriber = tracing_subscriber::registry().with(layer);

        assert_eq!(handle.current_level().as_deref(), Some("error"));
        handle.set_level("warn");
        assert_eq!(handle.current_level().as_deref(), Some("warn"));

        // garbage keeps the previous filter
        handle.set_level("not[a=level");
        assert_eq!(handle.current_level().as_deref(), Some("warn"));
    }

    #[test]
    fn test_rust_log_is_not_overridden() {
        let (layer, handle) = reloadable(EnvFilter::new("trace"), true);
        let _subscriber = tracing_subscriber::registry().with(layer);

        handle.set_level("error");
        assert_eq!(handle.current_level().as_deref(), Some("trace"));
    }
}
