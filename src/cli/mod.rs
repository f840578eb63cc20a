pub mod list;
pub mod ui;


use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{LoadError, ReaderConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Bluetooth name to scan for (case-insensitive substring)
    #[arg(long, global = true)]
    pub name: Option<String>,
    /// USB vendor id in hex, e.g. 1949
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    pub vid: Option<u16>,
    /// USB product id in hex, e.g. 0402
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    pub pid: Option<u16>,
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Connect to the controller and display its state (default)
    Run {
        /// Retry automatically this many times instead of asking
        #[arg(long)]
        retries: Option<u32>,
    },
    /// List visible HID devices
    List,
}

impl Args {
    /// The subcommand to run, [Commands::Run] if none was given
    pub fn command(&self) -> Commands {
        self.cmd.clone().unwrap_or(Commands::Run { retries: None })
    }
}

/// Build the reader configuration from the optional configuration file,
/// then apply any overrides given on the command line.
pub fn load_config(args: &Args) -> Result<ReaderConfig, LoadError> {
    let mut config = match args.config.as_ref() {
        Some(path) => ReaderConfig::from_yaml_path(path)?,
        None => ReaderConfig::default(),
    };

    if let Some(name) = args.name.as_ref() {
        config.device.name = name.clone();
    }
    if let Some(vendor_id) = args.vid {
        config.device.vendor_id = vendor_id;
    }
    if let Some(product_id) = args.pid {
        config.device.product_id = product_id;
    }

    Ok(config)
}

/// Parse a 16-bit hex id with an optional "0x" prefix
pub fn parse_hex_u16(value: &str) -> Result<u16, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{value}': {e}"))
}
