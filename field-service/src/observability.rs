use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "field_service=info,meter_client=info";

/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
