use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_CONFIG_PATH: &str = "./pic/pic.conf";
pub const DEFAULT_REQUEST_PATH: &str = "./input/gudGUI.input";

#[derive(Debug, Parser)]
#[command(
    name = "picgate",
    about = "Security-picture dialogs gating USB device admission",
    version
)]
pub struct Cli {
    /// Pool config file (totalNum, picDir, picFormat, picIndexConf)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Increase verbosity (may be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Let the user bind an unused security picture to a new device
    Enroll(EnrollArgs),
    /// Show the bound picture back and emit an admit/deny decision
    Confirm(ConfirmArgs),
}

#[derive(Debug, Args)]
pub struct EnrollArgs {
    /// Enrollment request file (product, manufacturer)
    #[arg(long, default_value = DEFAULT_REQUEST_PATH)]
    pub request: PathBuf,
}

#[derive(Debug, Args)]
pub struct ConfirmArgs {
    /// Confirmation request file written by the admission-control caller
    #[arg(long, default_value = DEFAULT_REQUEST_PATH)]
    pub request: PathBuf,

    /// Leave the request file in place instead of archiving it
    #[arg(long)]
    pub keep_request: bool,
}
