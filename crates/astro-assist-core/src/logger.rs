//! Stderr logging for hosts and tools.
//!
//! Lines look like `[   1.234s DEBUG drift::machine] message`. The polling
//! loops log every tick at `debug`; chatty third-party crates (image
//! decoders and the like) are held at `info` whatever the chosen level.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted by [`level_from_env`].
pub const LOG_ENV: &str = "ASTRO_ASSIST_LOG";

const CRATE_PREFIX: &str = "astro_assist";

#[cfg(feature = "tracing")]
const DEFAULT_DIRECTIVES: &str = "warn,astro_assist=info,astro_assist_core=info,\
astro_assist_hfd=info,astro_assist_drift=info";

/// `astro_assist_drift::machine` → `drift::machine`; foreign targets as-is.
fn short_target(target: &str) -> &str {
    match target.strip_prefix(CRATE_PREFIX) {
        Some(rest) => rest.trim_start_matches('_').trim_start_matches("::"),
        None => target,
    }
}

fn passes(level: LevelFilter, record_level: Level, target: &str) -> bool {
    if record_level > level {
        return false;
    }
    target.starts_with(CRATE_PREFIX) || record_level <= Level::Info
}

/// Parse a level name, falling back to `default` when absent or unknown.
pub fn parse_level(value: Option<&str>, default: LevelFilter) -> LevelFilter {
    value
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(default)
}

/// Level named by [`LOG_ENV`], or `default`.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    parse_level(std::env::var(LOG_ENV).ok().as_deref(), default)
}

struct TickLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for TickLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        passes(self.level, metadata.level(), metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:<5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<TickLogger> = OnceLock::new();

/// Install the stderr logger. Only the first call installs anything.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| TickLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing` subscriber; `RUST_LOG` overrides the default
/// directives that keep our crates at `info` and everything else at `warn`.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);
    let installed = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
    if installed.is_err() {
        log::debug!("tracing subscriber already installed");
    }
}
