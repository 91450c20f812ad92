use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GATEWAY_LOG";

/// Installs the stderr subscriber for a binary. Filter directives come from
/// `GATEWAY_LOG` and default to `default_directive`.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
