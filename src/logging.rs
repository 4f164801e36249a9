use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins; otherwise `bookscout=info`,
/// or `bookscout=debug` when verbose. Output goes to stderr so stdout stays
/// clean for `--json`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "bookscout=debug" } else { "bookscout=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // try_init: a second call (tests, embedders) is not an error
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
