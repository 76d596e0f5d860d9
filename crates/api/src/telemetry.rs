//! OTLP metrics export setup.

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    runtime, Resource,
};

/// Build the OTLP meter provider when an export endpoint is configured.
///
/// Returns None when telemetry is disabled. The returned provider has to
/// stay alive for the process lifetime, otherwise the periodic reader
/// stops exporting.
pub fn init_meter_provider(
    config: &config::TelemetryConfig,
) -> anyhow::Result<Option<SdkMeterProvider>> {
    let Some(endpoint) = config.otlp_endpoint.as_deref() else {
        return Ok(None);
    };

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let reader = PeriodicReader::builder(exporter, runtime::Tokio).build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]))
        .build();

    Ok(Some(provider))
}
