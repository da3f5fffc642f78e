pub mod cli;
pub mod data;
pub mod discover;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod reshape;
pub mod reshape_cmd;
pub mod schema;
pub mod schema_cmd;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    error::{ParseFailure, ReshapeWarning, Stage},
    frame::{InputTable, OutputTable},
    reshape::{ReshapeOutcome, ReshapeReport, reshape, reshape_with_observer},
    schema::ParcelSchema,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("parcel_reshape", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Reshape(args) => reshape_cmd::execute(&args),
        Commands::Discover(args) => discover::execute(&args),
        Commands::Schema(args) => schema_cmd::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
