#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `nettf-logging` is a thin [`tracing`]/[`tracing_subscriber`] wrapper used
//! by the CLI front-end. The core engine never calls into this crate
//! directly — it only emits `tracing` events, which are no-ops until a
//! subscriber is installed — so logging is strictly an external
//! collaborator per the engine's own contract: optional, and a no-op if
//! never initialized.
//!
//! # Design
//!
//! [`init`] installs a global [`tracing_subscriber::fmt`] subscriber exactly
//! once per process, gated by [`std::sync::Once`] so a CLI invocation that
//! calls it more than once (e.g. in tests that construct multiple `run`
//! calls) never panics on "a global subscriber has already been set".

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// How much detail the installed subscriber emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet,
    /// Frame start/end INFO plus warnings and errors (the engine's documented
    /// default: "MAY emit INFO on frame start/end and ERROR on failures").
    Normal,
    /// Everything `Normal` emits, plus per-chunk DEBUG traces.
    Verbose,
}

impl Verbosity {
    fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

/// Installs a global `tracing` subscriber at the given verbosity.
///
/// Idempotent: the first call in a process wins, and subsequent calls are
/// silently ignored rather than panicking. This lets CLI entry points call
/// `init` unconditionally instead of tracking whether it already ran.
pub fn init(verbosity: Verbosity) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    });
}
