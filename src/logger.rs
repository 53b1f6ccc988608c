use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub fn init_logging(verbose: bool) {
    let filter = select_filter(
        std::env::var("VTTTHUMBS_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
        verbose,
    );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

// Our own variable wins over RUST_LOG; an unparsable value falls back to info.
fn select_filter(own: Option<String>, rust_log: Option<String>, verbose: bool) -> EnvFilter {
    match own.or(rust_log) {
        Some(value) => EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    }
}
