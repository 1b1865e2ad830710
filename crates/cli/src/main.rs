//! App Store Connect relay CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** from the environment via
//!    [`relay::RelayConfig::from_env`] and refuse to start if it is invalid.
//! 2. **Wire observability**: configure `tracing-subscriber` with an
//!    `EnvFilter`, a JSON (or pretty) fmt layer on stderr, and, when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP exporter.
//!    All `tracing` spans and events emitted by every crate flow through here.
//! 3. **Construct infrastructure**: [`relay::EventProcessor::from_config`]
//!    builds the App Store Connect client and the webhook transport.
//! 4. **Process one event** read from a file or stdin, print the JSON report
//!    to stdout, and exit non-zero on a structured error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use relay::{EventProcessor, LogFormat, RelayConfig};
use tokio::io::AsyncReadExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const SERVICE_NAME: &str = "appstore-relay";

/// Relay one App Store Connect webhook event to the configured chat channels.
#[derive(Debug, Parser)]
#[command(name = "appstore-relay", version, about)]
struct Args {
    /// File holding the webhook JSON body. Reads stdin when omitted.
    #[arg(value_name = "EVENT_FILE")]
    event: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = RelayConfig::from_env().context("invalid relay configuration")?;

    let tracer_provider = init_tracing(&config)?;

    let body = read_body(args.event.as_deref()).await?;
    let processor = EventProcessor::from_config(&config);

    let (response, code) = match processor.process(&body).await {
        Ok(report) => (serde_json::to_value(&report)?, ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!(error = %err, kind = err.kind(), "event processing failed");
            (err.to_response(), ExitCode::FAILURE)
        }
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{rendered}");

    if let Some(provider) = tracer_provider {
        if let Err(err) = provider.shutdown() {
            eprintln!("failed to flush spans: {err}");
        }
    }

    Ok(code)
}

async fn read_body(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read event file {}", path.display())),
        None => {
            let mut body = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut body)
                .await
                .context("failed to read event from stdin")?;
            Ok(body)
        }
    }
}

/// Installs the global subscriber. Returns the tracer provider when OTLP
/// export is enabled so the caller can flush it on exit.
fn init_tracing(config: &RelayConfig) -> anyhow::Result<Option<TracerProvider>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let provider = match &config.otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()
                .context("failed to build OTLP span exporter")?;
            Some(
                TracerProvider::builder()
                    .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
                    .build(),
            )
        }
        None => None,
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(SERVICE_NAME)));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn event_file_is_optional() {
        let args = Args::try_parse_from(["appstore-relay", "--pretty"]).unwrap();
        assert!(args.event.is_none());
        assert!(args.pretty);

        let args = Args::try_parse_from(["appstore-relay", "event.json"]).unwrap();
        assert_eq!(args.event, Some(PathBuf::from("event.json")));
    }
}
