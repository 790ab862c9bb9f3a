use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::error::Error;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitoringConfig {
    pub service_name: String,
    pub logs: EnvFilterConfig,
    pub traces: Option<EnvFilterConfig>,
    pub otlp: Option<OtlpConfig>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvFilterConfig {
    pub default_level: String,
    #[serde(default)]
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OtlpConfig {
    pub url: Option<String>,
}

impl TryFrom<&EnvFilterConfig> for EnvFilter {
    type Error = tracing_subscriber::filter::ParseError;

    fn try_from(config: &EnvFilterConfig) -> Result<Self, Self::Error> {
        EnvFilter::builder()
            .with_default_directive(config.default_level.parse()?)
            .parse(config.filters.join(","))
    }
}

impl MonitoringConfig {
    pub fn init(&self) -> Result<(), Box<dyn Error>> {
        match &self.otlp {
            Some(otlp_config) => {
                let resource = Resource::builder()
                    .with_attribute(KeyValue::new("service.name", self.service_name.clone()))
                    .build();

                let tracer_provider = init_traces(resource, otlp_config.url.clone())?;
                let tracer = tracer_provider.tracer(self.service_name.clone());
                opentelemetry::global::set_tracer_provider(tracer_provider);

                let tracing_filter = EnvFilter::try_from(self.traces.as_ref().unwrap_or(&self.logs))?;
                let tracing_layer = OpenTelemetryLayer::new(tracer).with_filter(tracing_filter);

                let fmt_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::try_from(&self.logs)?);

                tracing_subscriber::registry().with(tracing_layer).with(fmt_layer).init();
            }
            None => {
                let fmt_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::try_from(&self.logs)?);

                tracing_subscriber::registry().with(fmt_layer).init();
            }
        }

        Ok(())
    }
}

fn init_traces(resource: Resource, url: Option<String>) -> Result<SdkTracerProvider, ExporterBuildError> {
    let builder = opentelemetry_otlp::SpanExporter::builder().with_tonic();
    let exporter = match url {
        Some(url) => builder.with_endpoint(url).build()?,
        None => builder.build()?,
    };

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}
