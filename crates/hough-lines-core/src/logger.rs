//! Stderr logger for the `log` facade.
//!
//! Lines look like `[  0.042s  WARN hough_lines_core::classifier] message`.
//! Install it with [`init_with_level`]; libraries in this workspace only
//! ever emit through `log` macros.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

/// Level is stored as `LevelFilter as usize` so it can change after install.
struct StderrLogger {
    level: AtomicUsize,
    started: OnceLock<Instant>,
}

impl StderrLogger {
    const fn new(level: LevelFilter) -> Self {
        Self {
            level: AtomicUsize::new(level as usize),
            started: OnceLock::new(),
        }
    }

    fn set_level(&self, level: LevelFilter) {
        self.level.store(level as usize, Ordering::Relaxed);
    }

    fn format(&self, record: &Record) -> String {
        let started = self.started.get_or_init(Instant::now);
        format!(
            "[{:7.3}s {:>5} {}] {}",
            started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() as usize <= self.level.load(Ordering::Relaxed)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "{}", self.format(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger::new(LevelFilter::Off);
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the stderr logger, or change its level if already installed.
///
/// Fails only when some other logger owns the `log` facade.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    LOGGER.set_level(level);
    if !INSTALLED.swap(true, Ordering::AcqRel) {
        LOGGER.started.get_or_init(Instant::now);
        if let Err(err) = log::set_logger(&LOGGER) {
            INSTALLED.store(false, Ordering::Release);
            return Err(err);
        }
    }
    log::set_max_level(level);
    Ok(())
}

/// Map a `-v` count to a level filter: 0 → warn, 1 → info, 2 → debug, more → trace.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install a `tracing` subscriber. `RUST_LOG` wins over `default_level`.
#[cfg(feature = "tracing")]
pub fn init_tracing(default_level: LevelFilter, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
