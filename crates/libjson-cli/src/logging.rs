//! Diagnostic output on stderr

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug output for
/// libjson and warnings only for everything else.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,libjson=debug,libjson_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
