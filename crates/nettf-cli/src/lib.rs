#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `nettf-cli` is the thin command-line front-end over [`nettf_engine`]. It
//! recognises three subcommands (`discover`, `receive`, `send`), opens the
//! TCP connection the engine is generic over, wires `SIGINT` into a
//! [`nettf_engine::CancelToken`], and translates [`nettf_engine::NettfError`]
//! into the single-line diagnostic plus nonzero exit code the specification
//! requires. None of the protocol logic lives here — this crate is
//! connection setup, argument parsing, and diagnostics only.
//!
//! # Design
//!
//! [`run`] mirrors the workspace's own CLI entry-point shape: it accepts an
//! argument iterator and writer handles for stdout/stderr rather than
//! touching the real process streams directly, so it can be driven from
//! tests without spawning a subprocess.
//!
//! # Invariants
//!
//! - `run` never panics on malformed arguments or a failed transfer; every
//!   failure path returns a nonzero exit code after writing a diagnostic.
//! - Exit code `0` only on a transfer, receive loop shutdown, or discovery
//!   scan that completed without a core engine error.

mod args;
mod discovery;

use std::ffi::OsString;
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use nettf_engine::{CancelToken, SendRequest};

pub use args::{Cli, Command};
pub use discovery::{scan, DiscoveredHost};

/// Default port the receiver binds and the sender connects to.
pub const DEFAULT_PORT: u16 = 9876;

/// Parses `arguments` and executes the selected subcommand, writing
/// human-readable output to `stdout` and diagnostics to `stderr`.
///
/// Returns the process exit code: `0` on success, nonzero otherwise.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    nettf_logging::init(nettf_logging::Verbosity::Normal);

    let cli = match Cli::try_parse_from(arguments) {
        Ok(cli) => cli,
        Err(error) => {
            use clap::error::ErrorKind;
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = write!(stdout, "{error}");
                return 0;
            }
            let _ = write!(stderr, "{error}");
            return 2;
        }
    };

    let config_path = cli
        .config
        .unwrap_or_else(|| std::path::PathBuf::from("nettf.toml"));
    let config = match nettf_config::Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            return 1;
        }
    };

    let cancel = CancelToken::new();
    install_sigint_handler(cancel.clone());

    match cli.command {
        Command::Discover { timeout } => {
            let timeout_ms = timeout.unwrap_or(config.discovery_timeout_ms);
            run_discover(timeout_ms, stdout)
        }
        Command::Receive { bind, root } => {
            let bind_addr = bind.unwrap_or_else(|| format!("{}:{}", config.listen_addr, config.listen_port));
            run_receive(
                Some(&bind_addr),
                root.as_deref(),
                &cancel,
                config.default_chunk_initial,
                stdout,
                stderr,
            )
        }
        Command::Send {
            ipv4,
            path,
            target_subdir,
        } => run_send(
            ipv4,
            &path,
            target_subdir,
            &cancel,
            config.default_chunk_initial,
            stdout,
            stderr,
        ),
    }
}

fn install_sigint_handler(cancel: CancelToken) {
    let result = ctrlc::set_handler(move || {
        tracing::warn!("SIGINT received");
        cancel.request();
    });
    if let Err(error) = result {
        tracing::warn!(%error, "failed to install SIGINT handler; Ctrl-C will not be cooperative");
    }
}

fn run_discover<Out: Write>(timeout_ms: u64, stdout: &mut Out) -> i32 {
    let hosts = scan(DEFAULT_PORT, Duration::from_millis(timeout_ms));
    if hosts.is_empty() {
        let _ = writeln!(stdout, "no NETTF receivers found");
    }
    for host in hosts {
        let _ = writeln!(stdout, "{}", host.addr);
    }
    0
}

fn run_receive<Out: Write, Err: Write>(
    bind: Option<&str>,
    root: Option<&Path>,
    cancel: &CancelToken,
    initial_chunk_size: u32,
    stdout: &mut Out,
    stderr: &mut Err,
) -> i32 {
    let bind_addr = bind.unwrap_or("0.0.0.0:9876").to_owned();
    let listener = match TcpListener::bind(&bind_addr) {
        Ok(listener) => listener,
        Err(error) => {
            let _ = writeln!(stderr, "BindError: {error}");
            return 1;
        }
    };
    // Non-blocking so the accept loop can re-poll `cancel` at a steady
    // cadence instead of being stuck inside a blocking `accept` call until
    // the next peer connects.
    if let Err(error) = listener.set_nonblocking(true) {
        let _ = writeln!(stderr, "BindError: {error}");
        return 1;
    }
    let root = root.map_or_else(|| std::path::PathBuf::from("."), Path::to_path_buf);

    let _ = writeln!(stdout, "listening on {bind_addr}");

    loop {
        if cancel.poll() == nettf_engine::CancelState::Forced {
            break;
        }

        let mut stream = match listener.accept() {
            Ok((stream, _)) => stream,
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(error) => {
                let _ = writeln!(stderr, "TransportError: {error}");
                continue;
            }
        };
        let _ = stream.set_nonblocking(false);

        match nettf_engine::receive_frame_with_initial_chunk_size(&mut stream, &root, cancel, initial_chunk_size) {
            Ok(summary) => {
                let _ = writeln!(stdout, "received {} file(s), {} bytes", summary.files, summary.bytes);
            }
            Err(error) => {
                let _ = writeln!(stderr, "{error}");
            }
        }
    }

    0
}

fn run_send<Out: Write, Err: Write>(
    ipv4: std::net::Ipv4Addr,
    path: &Path,
    target_subdir: Option<String>,
    cancel: &CancelToken,
    initial_chunk_size: u32,
    stdout: &mut Out,
    stderr: &mut Err,
) -> i32 {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            let _ = writeln!(stderr, "FileError: stat {path:?}: {error}");
            return 1;
        }
    };

    let request = if metadata.is_dir() {
        SendRequest::Tree {
            source: path.to_path_buf(),
            target_dir: target_subdir,
        }
    } else {
        SendRequest::File {
            source: path.to_path_buf(),
            target_dir: target_subdir,
        }
    };

    let mut stream = match TcpStream::connect((ipv4, DEFAULT_PORT)) {
        Ok(stream) => stream,
        Err(error) => {
            let _ = writeln!(stderr, "TransportError: {error}");
            return 1;
        }
    };

    match nettf_engine::send_frame_with_initial_chunk_size(&mut stream, &request, cancel, initial_chunk_size) {
        Ok(summary) => {
            let _ = writeln!(stdout, "sent {} file(s), {} bytes", summary.files, summary.bytes);
            0
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            1
        }
    }
}
