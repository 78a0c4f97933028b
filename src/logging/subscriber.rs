//! Tracing subscriber setup: console formatter, build log layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target for stage headers (`Building debug`, `Cleaning build directory`).
pub(super) const STAGE_TARGET: &str = "compile::stage";

/// Target for step results, which only the build log renders in full.
pub(super) const STEP_TARGET: &str = "compile::step";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    Step,
    Error,
    Warning,
    Info,
    Detail,
}

impl Kind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (_, STAGE_TARGET) => Self::Stage,
            (_, STEP_TARGET) => Self::Step,
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warning,
            (Level::INFO, _) => Self::Info,
            _ => Self::Detail,
        }
    }

    /// Prefix used in the plain-text build log.
    const fn log_prefix(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::Step => "    [step] ",
            Self::Error => "    [error] ",
            Self::Warning => "    [warn] ",
            Self::Info => "    ",
            Self::Detail => "    [debug] ",
        }
    }
}

/// Pulls the formatted `message` field out of an event.
fn message_of(event: &tracing::Event<'_>) -> String {
    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut message = Message(String::new());
    event.record(&mut message);
    message.0
}

/// A [`tracing_subscriber::Layer`] that appends every event to the build log
/// for one command, timestamped and with ANSI codes stripped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the build log at `path`, write a header naming `command`,
    /// and return a layer appending to it.
    ///
    /// Returns `None` if the file cannot be written.
    pub(super) fn at(path: &Path, command: &str) -> Option<Self> {
        let version =
            option_env!("COMPILE_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "# compile {command} ({version}) started {} UTC\n",
            format_utc_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let kind = Kind::of(event.metadata());
        let msg = strip_ansi(&message_of(event));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {}{msg}", format_utc_time(), kind.log_prefix()).ok();
        }
    }
}

/// Console output in the style of compiler diagnostics.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let msg = message_of(event);
        match Kind::of(event.metadata()) {
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::Error => writeln!(writer, "\x1b[1;31merror\x1b[0m: {msg}"),
            Kind::Warning => writeln!(writer, "\x1b[1;33mwarning\x1b[0m: {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Step | Kind::Detail => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber for `command`.
///
/// Errors and warnings go to stderr, everything else to stdout; debug
/// detail and step results only reach the console when `verbose`. Every
/// event is also written to `$XDG_CACHE_HOME/compile/<command>.log`.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = log_file_path(command)
        .and_then(|path| FileLayer::at(&path, command))
        .map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
