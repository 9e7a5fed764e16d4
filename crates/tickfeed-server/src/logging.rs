//! Logging configuration and initialization.
//!
//! Text output through `tracing-subscriber`. `RUST_LOG` replaces the
//! built-in directives when set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directives: vec![
                "tickfeed=info".into(),
                "tickfeed::ws::control=off".into(),
                "tower_http=warn".into(),
            ],
        }
    }
}

impl LogConfig {
    /// Build an EnvFilter from this configuration.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        self.filter_from_directives()
    }

    fn filter_from_directives(&self) -> EnvFilter {
        let filter_str = self.directives.join(",");
        EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize the tracing subscriber with the given configuration.
pub fn init(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(config.build_filter())
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}
