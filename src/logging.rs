use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_FILTER: &str = "userhub=debug,tower_http=debug";

/// The filter used when `RUST_LOG` is unset.
pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber: a console layer, plus a daily rolling JSON
/// file under `LOG_DIR` when that variable is set.
///
/// Keep the returned guard alive until exit or buffered file lines are lost.
pub fn init_tracing() -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(default_filter());

    let Ok(log_dir) = std::env::var("LOG_DIR") else {
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    };

    let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "userhub.json");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let json_layer = fmt::layer()
        .json()
        .with_writer(writer)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(default_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(json_layer)
        .init();

    tracing::info!(log_dir = %log_dir, "json file logging enabled");
    Some(guard)
}
