use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Crates whose log level follows the `verbose` flag
const CONSOLE_CRATES: &[&str] = &["church_console", "services", "models", "utils"];

/// Build the filter used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    let mut directives = vec!["warn".to_string()];
    directives.extend(CONSOLE_CRATES.iter().map(|name| format!("{}={}", name, level)));
    directives.join(",")
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// usable for exported tables.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .with(filter)
        .try_init();
}
