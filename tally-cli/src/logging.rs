use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Compact stderr logging. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "tally=debug,tally_core=debug,tally_ingest=debug,tally_finance=debug"
    } else {
        "tally=info,tally_core=warn,tally_ingest=warn,tally_finance=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
