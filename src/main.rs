use std::env;
use std::error::Error;
use std::process;

use clap::Parser;

use crate::bluetooth::btle::BtleTransport;
use crate::cli::{
    list::handle_list,
    load_config,
    ui::{StatusLine, TerminalReporter, TerminalView},
    Args, Commands,
};
use crate::config::ReaderConfig;
use crate::hid::hidraw::HidApiBackend;
use crate::reader::{
    retry::{LimitedRetry, PromptRetry, RetryPolicy},
    GamepadReader, Outcome,
};
use crate::sync::{stop_channel, StopSignal, TokioClock};

mod bluetooth;
mod cli;
mod config;
mod drivers;
mod hid;
mod reader;
mod sync;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;
    log::debug!("Using configuration: {config:?}");

    // The HID subsystem is required on every path
    let mut hid = match HidApiBackend::new() {
        Ok(hid) => hid,
        Err(e) => {
            log::error!("Unable to initialize HID subsystem: {e}");
            process::exit(1);
        }
    };

    let retries = match args.command() {
        Commands::List => return handle_list(&mut hid, &config.device),
        Commands::Run { retries } => retries,
    };

    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting gamepad-reader v{VERSION} for {}", config.device);

    // Setup CTRL+C handler
    let (stop, signal) = stop_channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for CTRL+C: {e}");
            return;
        }
        log::info!("Shutting down");
        stop.stop();
    });

    let outcome = match retries {
        Some(retries) => run(config, hid, LimitedRetry::new(retries), signal).await?,
        None => run(config, hid, PromptRetry::new(), signal).await?,
    };
    log::info!("Cleanup complete.");

    // A pending read of the retry prompt would keep the runtime alive
    if outcome == Outcome::Stopped {
        process::exit(0);
    }

    Ok(())
}

/// Run the reader until it is stopped or the retry policy gives up
async fn run<R: RetryPolicy>(
    config: ReaderConfig,
    hid: HidApiBackend,
    retry: R,
    signal: StopSignal,
) -> Result<Outcome, Box<dyn Error>> {
    let status = StatusLine::default();
    let view = TerminalView::new(status.clone())?;
    let mut reader = GamepadReader::new(
        config,
        hid,
        BtleTransport::new(),
        TokioClock,
        retry,
        Box::new(view),
        Box::new(TerminalReporter::new(status)),
        signal,
    );

    Ok(reader.run().await)
}
