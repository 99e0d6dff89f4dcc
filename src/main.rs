// skiff - a small concurrent TCP port scanner

use clap::Parser;
use skiff::cli::Args;
use skiff::error::exit_code;
use skiff::output;
use skiff::scanner::{cancel_pair, CancelHandle};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(exit_code::USAGE);
        }
    };

    init_tracing(args.verbose);

    let (handle, signal) = cancel_pair();
    tokio::spawn(handle_interrupts(handle));

    match args.execute(signal).await {
        Ok(summary) if summary.is_interrupted() => ExitCode::from(exit_code::INTERRUPTED),
        Ok(_) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

/// First Ctrl-C stops the scan cleanly, a second one exits immediately.
async fn handle_interrupts(handle: CancelHandle) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    output::print_warning("Interrupt received, stopping scan (Ctrl-C again to force quit)");
    handle.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(i32::from(exit_code::INTERRUPTED));
    }
}

/// Log to stderr. `RUST_LOG` overrides the `-v` count.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skiff={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
