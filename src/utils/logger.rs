use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Collects event fields as JSON attributes.
#[derive(Default)]
struct Attributes(Map<String, Value>);

impl Attributes {
    /// `event_name` / `event_domain` are written with underscores at call sites
    /// and renamed to their semantic-convention keys here.
    fn key(field: &Field) -> String {
        match field.name() {
            "event_name" => "event.name".to_string(),
            "event_domain" => "event.domain".to_string(),
            other => other.to_string(),
        }
    }
}

impl Visit for Attributes {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(Self::key(field), json!(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(Self::key(field), json!(format!("{:?}", value)));
    }
}

/// One JSON object per line, shaped like an OpenTelemetry log record.
struct OtelJsonFormat {
    service_name: String,
    service_version: String,
}

fn severity_number(level: &Level) -> u64 {
    match *level {
        Level::TRACE => 1,
        Level::DEBUG => 5,
        Level::INFO => 9,
        Level::WARN => 13,
        Level::ERROR => 17,
    }
}

impl<S, N> FormatEvent<S, N> for OtelJsonFormat
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut attributes = Attributes::default();
        event.record(&mut attributes);
        let mut attributes = attributes.0;

        let body = match attributes.remove("message") {
            Some(Value::String(message)) => message,
            _ => metadata.name().to_string(),
        };
        attributes.insert("code.target".into(), json!(metadata.target()));
        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".into(), json!(file));
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".into(), json!(line));
        }

        let record = json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "severity_text": metadata.level().as_str(),
            "severity_number": severity_number(metadata.level()),
            "body": body,
            "resource": {
                "service.name": self.service_name,
                "service.version": self.service_version,
            },
            "attributes": attributes,
        });

        let line = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Parses `logging.level`.
pub fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(format!(
            "Invalid logging.level '{}'. Valid values: trace, debug, info, warn, error",
            level
        )),
    }
}

/// Installs the global tracing subscriber and routes `log` records (reqwest, hyper) into it.
/// `RUST_LOG` directives, when set, refine the configured level.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), String> {
    let level = parse_level(&logging_config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let installed = match logging_config.format.trim().to_lowercase().as_str() {
        "json" => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().event_format(OtelJsonFormat {
                    service_name: logging_config.service_name.clone(),
                    service_version: logging_config.service_version.clone(),
                })),
        ),
        // "console" and anything unknown: human-readable output
        _ => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty()),
        ),
    };
    installed.map_err(|e| format!("Failed to install tracing subscriber: {}", e))?;

    tracing_log::LogTracer::init().map_err(|e| format!("Failed to bridge log records: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_accepts_known_levels() {
        assert_eq!(parse_level("info"), Ok(LevelFilter::INFO));
        assert_eq!(parse_level(" DEBUG "), Ok(LevelFilter::DEBUG));
        assert_eq!(parse_level("error"), Ok(LevelFilter::ERROR));
    }

    #[test]
    fn test_parse_level_rejects_unknown_levels() {
        let err = parse_level("verbose").unwrap_err();
        assert!(err.contains("verbose"));
    }

    #[test]
    fn test_severity_numbers_follow_otel() {
        assert_eq!(severity_number(&Level::TRACE), 1);
        assert_eq!(severity_number(&Level::INFO), 9);
        assert_eq!(severity_number(&Level::ERROR), 17);
    }
}
