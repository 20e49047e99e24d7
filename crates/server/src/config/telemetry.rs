use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// OTLP transport for exported spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    Http,
}

impl fmt::Display for OtlpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grpc => "grpc",
            Self::Http => "http",
        })
    }
}

/// `[telemetry]`: span export for interaction handling and archive jobs.
///
/// Disabled by default; logs still go to stdout either way. An unknown
/// `protocol` is a configuration error rather than a silent fallback.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Collector address, e.g. `http://otel-collector:4317`.
    pub endpoint: String,
    pub service_name: String,
    /// Fraction of traces kept, clamped to `0.0..=1.0`.
    pub sample_ratio: f64,
    pub protocol: OtlpProtocol,
    pub timeout_seconds: u64,
    /// Extra resource attributes attached to every span.
    pub resource_attributes: HashMap<String, String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:4317".to_owned(),
            service_name: "archivist".to_owned(),
            sample_ratio: 1.0,
            protocol: OtlpProtocol::default(),
            timeout_seconds: 10,
            resource_attributes: HashMap::new(),
        }
    }
}
