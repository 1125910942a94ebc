use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global fmt subscriber once.
///
/// `RUST_LOG` takes precedence over `default_filter` when it is set and parses.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("finmate=info"));

        // A subscriber installed by an embedding application stays in place.
        let _ = fmt().with_env_filter(filter).with_target(true).try_init();
    });
}
