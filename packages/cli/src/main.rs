#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `covid_map`: draws Italian COVID-19 case counts as proportional
//! markers on a map of Italy.
//!
//! With a subcommand it renders once and exits. Without one it starts the
//! interactive prompt loop.

mod display;
mod interactive;
mod pipeline;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use covid_map_config::AppConfig;
use covid_map_dataset::http::build_client;
use covid_map_selector::{DatasetSelection, parse_region_choice};

#[derive(Parser)]
#[command(
    name = "covid_map",
    about = "Render Italian COVID-19 case counts as proportional markers on a map"
)]
struct Cli {
    /// Configuration file replacing the built-in defaults
    #[arg(long, global = true, env = "COVID_MAP_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the rendered PNG (defaults to `output.path` in the config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Open the rendered map in the system image viewer
    #[arg(long, global = true)]
    open: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cumulative cases per province, from the latest snapshot
    Province,
    /// Cases per region
    Region {
        /// `total` for the latest cumulative counts, or a `YYYYMMDD` date
        /// for the new cases reported that day
        #[arg(long, default_value = "total")]
        date: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = covid_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let settings = AppConfig::load(cli.config.as_deref())?;
    let client = build_client(settings.http_timeout, &settings.user_agent)?;
    let output = cli.output.unwrap_or_else(|| settings.output_path.clone());

    let Some(command) = cli.command else {
        return interactive::run(&settings, &client, &output, &multi).await;
    };

    let selection = match command {
        Commands::Province => DatasetSelection::Province,
        Commands::Region { date } => {
            let now = Utc::now().with_timezone(&settings.date_rules.timezone);
            parse_region_choice(&date, &settings.date_rules, now)?
        }
    };

    let path = pipeline::run(&settings, &client, selection, &output, &multi).await?;

    if cli.open {
        display::open_in_viewer(&path);
    }

    Ok(())
}
