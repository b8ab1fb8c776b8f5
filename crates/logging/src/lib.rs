#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` gates the replication engine's console chatter behind the
//! CLI's `-v`/`-d` counters. It mirrors `tracing`'s level hierarchy rather
//! than re-deriving one: [`init`] installs a `tracing-subscriber` filter
//! sized to the configured verbosity, and [`info_log!`]/[`debug_log!`] emit
//! through `tracing::info!`/`tracing::debug!` after a level check so callers
//! that build an expensive message can skip the work when it would be
//! dropped anyway.
//!
//! Levels follow spec §6: `verbose` 0 (silent) through 3 (per-node detail);
//! `debug` is a second, independent counter raised by repeating `-d`.

use std::sync::{Mutex, OnceLock};

use tracing_subscriber::EnvFilter;

/// The verbosity levels the CLI's `-v` and `-d` counters drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerbosityConfig {
    /// `-v`/`--verbose` count, clamped to `0..=3`.
    pub verbose: u8,
    /// `-d`/`--debug` count, clamped to `0..=3`.
    pub debug: u8,
}

impl VerbosityConfig {
    /// Builds a config from a raw `-v` repeat count, clamped to the spec's
    /// four levels.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        Self {
            verbose: level.min(3),
            debug: 0,
        }
    }

    /// Builds a config from independent `-v`/`-d` repeat counts.
    #[must_use]
    pub fn from_levels(verbose: u8, debug: u8) -> Self {
        Self {
            verbose: verbose.min(3),
            debug: debug.min(3),
        }
    }
}

static CURRENT: OnceLock<Mutex<VerbosityConfig>> = OnceLock::new();
static EVENTS: OnceLock<Mutex<Vec<LogEvent>>> = OnceLock::new();

fn current_cell() -> &'static Mutex<VerbosityConfig> {
    CURRENT.get_or_init(|| Mutex::new(VerbosityConfig::default()))
}

fn events_cell() -> &'static Mutex<Vec<LogEvent>> {
    EVENTS.get_or_init(|| Mutex::new(Vec::new()))
}

/// Installs `config` as the process-wide verbosity and (best-effort) sets
/// up a `tracing-subscriber` filter matching it. Safe to call more than
/// once; later calls replace the active config, which test suites rely on
/// to reset state between cases.
pub fn init(config: VerbosityConfig) {
    *current_cell().lock().expect("verbosity mutex poisoned") = config;

    let directive = match config.verbose.max(config.debug) {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .try_init();
}

/// The process-wide verbosity config installed by the last [`init`] call.
#[must_use]
pub fn current() -> VerbosityConfig {
    *current_cell().lock().expect("verbosity mutex poisoned")
}

/// One captured log event, recorded for test assertions independent of
/// whatever `tracing` subscriber is (or isn't) installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Whether this came from [`info_log!`] or [`debug_log!`].
    pub kind: EventKind,
    /// The level the call site requested.
    pub level: u8,
    /// The formatted message.
    pub message: String,
}

/// Which macro produced a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Produced by [`info_log!`].
    Info,
    /// Produced by [`debug_log!`].
    Debug,
}

/// Returns whether an `info_log!` call at `level` would currently emit.
#[must_use]
pub fn info_enabled(level: u8) -> bool {
    current().verbose >= level
}

/// Returns whether a `debug_log!` call at `level` would currently emit.
#[must_use]
pub fn debug_enabled(level: u8) -> bool {
    current().debug >= level
}

#[doc(hidden)]
pub fn record_info(level: u8, message: std::fmt::Arguments<'_>) {
    if !info_enabled(level) {
        return;
    }
    let message = message.to_string();
    tracing::info!(%level, "{message}");
    events_cell()
        .lock()
        .expect("events mutex poisoned")
        .push(LogEvent {
            kind: EventKind::Info,
            level,
            message,
        });
}

#[doc(hidden)]
pub fn record_debug(level: u8, message: std::fmt::Arguments<'_>) {
    if !debug_enabled(level) {
        return;
    }
    let message = message.to_string();
    tracing::debug!(%level, "{message}");
    events_cell()
        .lock()
        .expect("events mutex poisoned")
        .push(LogEvent {
            kind: EventKind::Debug,
            level,
            message,
        });
}

/// Drains and returns every [`LogEvent`] recorded since the last drain.
///
/// Intended for tests; ordinary callers observe output through the
/// `tracing` subscriber installed by [`init`].
pub fn drain_events() -> Vec<LogEvent> {
    std::mem::take(&mut *events_cell().lock().expect("events mutex poisoned"))
}

/// Logs a per-action or progress message, gated by the `-v` counter.
///
/// `info_log!(1, "created {}", path.display())` only emits once
/// [`VerbosityConfig::verbose`] is at least `1`.
#[macro_export]
macro_rules! info_log {
    ($level:expr, $($arg:tt)+) => {
        $crate::record_info($level, format_args!($($arg)+))
    };
}

/// Logs an internal diagnostic message, gated by the `-d` counter.
#[macro_export]
macro_rules! debug_log {
    ($level:expr, $($arg:tt)+) => {
        $crate::record_debug($level, format_args!($($arg)+))
    };
}
