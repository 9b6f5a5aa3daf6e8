use tracing_subscriber::EnvFilter;

/// Installs a thread-local fmt subscriber for the duration of one test so
/// dispatch logging is visible under `RUST_LOG=debug` without polluting other
/// tests' output.
pub struct TestTracing {
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self { _guard: guard }
    }
}
