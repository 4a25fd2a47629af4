use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `default_directive`.
///
/// Logs go to stderr so stdout carries only the transcript.
pub fn init_tracing(json: bool, default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    // A subscriber may already be installed (tests); keep it.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
