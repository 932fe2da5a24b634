use tracing_subscriber::EnvFilter;

/// Stdout carries the report, so only warnings are logged unless asked for more.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// `CARSTATUS_LOG_LEVEL`, falling back to `RUST_LOG`, then [`DEFAULT_LOG_FILTER`].
pub fn log_filter_from_env() -> String {
    std::env::var("CARSTATUS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string())
}

pub fn env_filter(directives: &str) -> EnvFilter {
    // keep connection pool chatter out of debug runs
    let combined = format!("{directives},hyper_util=warn");
    EnvFilter::try_new(combined)
        .unwrap_or_else(|_| EnvFilter::new(format!("{DEFAULT_LOG_FILTER},hyper_util=warn")))
}

/// Install the global subscriber, writing compact lines to stderr.
pub fn init() {
    let directives = log_filter_from_env();
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(&directives))
        .init();
    tracing::debug!("carstatus: log filter: {}", directives);
}
