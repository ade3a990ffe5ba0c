//! Tracing subscriber for the API process.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{ServerConfig, observability::LogFormat};

use super::ObservabilityError;

/// Dependencies that are noisy at `info`. Statement logging from sqlx is
/// only useful when asked for explicitly through `RUST_LOG`.
const QUIET_TARGETS: [&str; 6] = ["h2", "hyper", "tonic", "opentelemetry", "reqwest", "sqlx"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let otel_layer = tracer_provider.map(|provider| {
        let tracer = provider.tracer(config.observability.otel_service_name.clone());

        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(fmt_layer(config.logging.log_format))
        .with(env_filter(&config.logging.log_level))
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

fn fmt_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
    }
}

/// `RUST_LOG` wins when it parses. Otherwise `level` applies to our crates
/// and the quiet dependencies are held at `warn`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_ignored| EnvFilter::new(directives(level)))
}

fn directives(level: &str) -> String {
    QUIET_TARGETS
        .iter()
        .fold(level.to_string(), |mut directives, target| {
            directives.push(',');
            directives.push_str(target);
            directives.push_str("=warn");
            directives
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_targets_follow_the_base_level() {
        assert_eq!(
            directives("debug"),
            "debug,h2=warn,hyper=warn,tonic=warn,opentelemetry=warn,reqwest=warn,sqlx=warn"
        );
    }

    #[test]
    fn directives_parse_as_a_filter() {
        let parsed = directives("folio_app=trace,info").parse::<EnvFilter>();

        assert!(parsed.is_ok(), "directives should parse: {parsed:?}");
    }
}
