// Structured logging setup and span helpers

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize tracing with structured JSON output. Correlation ids and
/// structured fields carry the observability story; there is no exporter
/// behind this, logs are the product.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Veritas telemetry initialized with structured logging");
    Ok(())
}

/// Plain-text variant for interactive use (the demo binary).
pub fn init_telemetry_pretty() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with common pipeline attributes
pub fn create_pipeline_span(operation: &str, report_id: Uuid) -> tracing::Span {
    tracing::info_span!(
        "report_pipeline",
        operation = operation,
        report.id = %report_id,
        otel.kind = "internal"
    )
}

/// Shutdown telemetry gracefully
pub fn shutdown_telemetry() {
    tracing::info!("Veritas telemetry shutdown complete");
}
