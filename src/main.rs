use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use picgate::cli::{Cli, Commands};
use picgate::confirm::{self, ConfirmationConfig};
use picgate::errors::AppError;
use picgate::output::{emit_token, render_error, CONFIRM_PREFIX, ENROLL_PREFIX};
use picgate::store::IndexStore;
use picgate::{config, enroll, request};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            render_error(&err);
            err.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let settings = config::load(&cli.config)?;

    match cli.command {
        Commands::Enroll(args) => {
            let request = request::load_enrollment(&args.request)?;
            let mut store = IndexStore::load(&settings.index_store_path)?;
            let decision = enroll::run_enrollment(&settings, &request, &mut store)?;
            emit_token(ENROLL_PREFIX, decision.token_value())?;
        }
        Commands::Confirm(args) => {
            let request = request::load_confirmation(&args.request, settings.pool_size)?;
            let mut store = IndexStore::load(&settings.index_store_path)?;
            let config = ConfirmationConfig {
                request_path: args.request,
                keep_request: args.keep_request,
            };
            let outcome = confirm::run_confirmation(&settings, &config, &request, &mut store)?;
            emit_token(CONFIRM_PREFIX, outcome.decision.token_value())?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let registry = tracing_subscriber::registry().with(fmt_layer);
    if tracing::subscriber::set_global_default(registry).is_err() {
        // Already initialised (tests).
    }
}
