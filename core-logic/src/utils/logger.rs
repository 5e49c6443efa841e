use crate::config::LogConfig;
use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Target used for per-step results. Lines on this target always reach the
/// console at INFO.
pub const RESULT_TARGET: &str = "task_result";

/// Installs the global subscriber: a coloured console layer and an hourly
/// rolling file layer under `config.dir`.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. If the log directory cannot be created only the
/// console layer is installed and `None` is returned.
pub fn setup_logger(config: &LogConfig) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(&config.dir).is_err() {
        tracing_subscriber::registry().with(console_layer()).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::hourly(&config.dir, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The file keeps debug detail such as mint-creation signatures
    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target(RESULT_TARGET, Level::INFO)
        .with_target("core_logic", Level::DEBUG)
        .with_target("solana_project", Level::DEBUG)
        .with_default(Level::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer())
        .init();

    Some(guard)
}

/// Console output: step results at INFO, everything else from WARN up.
fn console_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target(RESULT_TARGET, Level::INFO)
        .with_default(Level::WARN);

    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter)
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn event_message(event: &Event<'_>) -> String {
    let mut visitor = MessageVisitor {
        message: String::new(),
    };
    event.record(&mut visitor);
    visitor.message
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let msg = event_message(event);

        match *event.metadata().level() {
            Level::ERROR => {
                let red = Style::new().fg(Color::LightRed).bold();
                return writeln!(writer, "{} {}", red.paint("ERROR"), msg);
            }
            Level::WARN => {
                let yellow = Style::new().fg(Color::LightYellow);
                return writeln!(writer, "{} {}", yellow.paint("WARN "), msg);
            }
            _ => {}
        }

        let colored_msg = if msg.contains("Success") {
            let green_text = Style::new().fg(Color::LightGreen).bold();
            msg.replace("Success", &format!("{}", green_text.paint("Success")))
        } else if msg.contains("Failed") {
            let red_text = Style::new().fg(Color::LightRed).bold();
            msg.replace("Failed", &format!("{}", red_text.paint("Failed")))
        } else {
            msg
        };

        writeln!(writer, "{}", colored_msg)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let meta = event.metadata();

        writeln!(
            writer,
            "{} [{}] {}: {}",
            timestamp,
            meta.level(),
            meta.target(),
            event_message(event)
        )
    }
}
