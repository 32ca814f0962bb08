//! The global tracing bootstrap. Kept in its own test binary because it
//! installs a process-wide subscriber.

use hello_trace::config::TelemetryConfig;
use hello_trace::observability::{self, TelemetryError};

#[test]
fn test_init_once_per_process() {
    let config = TelemetryConfig::default();

    // no runtime yet: refused, and the slot stays free
    assert!(matches!(
        observability::init(&config),
        Err(TelemetryError::NoRuntime)
    ));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let handle = observability::init(&config).expect("first init");
        assert!(matches!(
            observability::init(&config),
            Err(TelemetryError::AlreadyInitialized)
        ));

        {
            let _span = tracing::info_span!("bootstrap.check", otel.kind = "internal").entered();
            tracing::info!("inside span");
        }

        handle.force_flush().await.unwrap();
        handle.shutdown().await.unwrap();
    });
}
