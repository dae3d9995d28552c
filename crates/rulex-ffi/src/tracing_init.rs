use std::fmt::{self as stdfmt, Write as _};
use std::path::Path;

use anyhow::Result;
use rulex_config::{LogFormat, LoggingConfig};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// FileFields: separate field cache for the file layer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FileFields(DefaultFields);

impl<'writer> fmt::FormatFields<'writer> for FileFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: fmt::format::Writer<'writer>,
        fields: R,
    ) -> stdfmt::Result {
        self.0.format_fields(writer, fields)
    }
}

// ---------------------------------------------------------------------------
// DomainFormat: `[domain]` prefix for plain output
// ---------------------------------------------------------------------------

/// Plain-text event formatter that lifts the `domain` field into a prefix:
///
/// ```text
/// 2026-03-02T10:04:11Z DEBUG [parse] expression rejected code=1201 position=1
/// ```
///
/// Events without a `domain` field print without the prefix.
struct DomainFormat {
    timer: SystemTime,
}

impl DomainFormat {
    fn new() -> Self {
        Self { timer: SystemTime }
    }
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> fmt::FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();

        if self.timer.format_time(&mut writer).is_err() {
            write!(writer, "<unknown time>")?;
        }

        let level = *event.metadata().level();
        if ansi {
            let color = match level {
                Level::ERROR => "31",
                Level::WARN => "33",
                Level::INFO => "32",
                Level::DEBUG => "34",
                Level::TRACE => "35",
            };
            write!(writer, " \x1b[{color}m{level:>5}\x1b[0m ")?;
        } else {
            write!(writer, " {level:>5} ")?;
        }

        let mut fields = DomainFields::default();
        event.record(&mut fields);

        if let Some(domain) = &fields.domain {
            if ansi {
                write!(writer, "\x1b[1;36m[{domain}]\x1b[0m ")?;
            } else {
                write!(writer, "[{domain}] ")?;
            }
        }
        write!(writer, "{}", fields.message)?;
        if !fields.rest.is_empty() {
            write!(writer, " {}", fields.rest)?;
        }
        writeln!(writer)
    }
}

/// Splits `domain` and `message` from the remaining key=value pairs.
#[derive(Default)]
struct DomainFields {
    domain: Option<String>,
    message: String,
    rest: String,
}

impl DomainFields {
    fn push(&mut self, name: &str, value: impl stdfmt::Display) {
        if !self.rest.is_empty() {
            self.rest.push(' ');
        }
        write!(&mut self.rest, "{name}={value}").ok();
    }
}

impl Visit for DomainFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.push(name, format_args!("{value:?}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => self.domain = Some(format!("{value:?}").trim_matches('"').to_string()),
            "message" => {
                write!(&mut self.message, "{value:?}").ok();
            }
            name => self.push(name, format_args!("{value:?}")),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field.name(), value);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Install the `tracing` subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level and module
/// overrides. Relative `file` paths resolve against `base_dir`. The returned
/// guard flushes the file writer on drop and must outlive all logging.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let directives = config.filter_directives();
        EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))?
    };

    let mut guard = None;
    let file_writer = match &config.file {
        Some(path) => {
            let resolved = base_dir.join(path);
            let dir = resolved
                .parent()
                .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;
            let file_name = resolved
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?;
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            guard = Some(file_guard);
            Some(writer)
        }
        None => None,
    };

    let json = config.format == LogFormat::Json;

    // JSON keeps `domain` as an ordinary field; plain output prefixes it.
    let plain_stderr = (!json).then(|| {
        fmt::layer()
            .event_format(DomainFormat::new())
            .with_writer(std::io::stderr)
    });
    let json_stderr = json.then(|| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let plain_file = file_writer.clone().filter(|_| !json).map(|w| {
        fmt::layer()
            .event_format(DomainFormat::new())
            .fmt_fields(FileFields::default())
            .with_ansi(false)
            .with_writer(w)
    });
    let json_file = file_writer.filter(|_| json).map(|w| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_ansi(false)
            .with_writer(w)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(plain_stderr)
        .with(json_stderr)
        .with(plain_file)
        .with(json_file)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install tracing subscriber: {e}"))?;

    Ok(guard)
}
