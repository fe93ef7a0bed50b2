//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize diagnostics on stderr so the rendered document can go to
/// stdout untouched.
///
/// The default level is warn, which surfaces every skipped namespace,
/// resource kind, and unresolved reference; `--debug` raises our own crate
/// to debug, and `RUST_LOG` overrides both.
pub fn init_logging(debug: bool) {
    let default_filter = if debug {
        "kubetopo=debug,kube=info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}
