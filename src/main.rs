mod commands;
mod render;
mod source;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use calview_core::config::CalViewConfig;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::events::EventsArgs;

#[derive(Parser)]
#[command(name = "calview")]
#[command(about = "Browse a calendar through a cache that only fetches days it has not seen")]
struct Cli {
    /// Zone used to read dates (defaults to the config timezone)
    #[arg(long, global = true)]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events of a calendar, loading the range window by window
    Events {
        /// JSON file with the events the source serves
        #[arg(long)]
        source: PathBuf,

        /// JSON file with local edits not yet on the source
        #[arg(long)]
        pending: Option<PathBuf>,

        /// Calendar to show
        #[arg(short, long, default_value = "default")]
        calendar: String,

        /// First day (YYYY-MM-DD)
        #[arg(long, value_parser = utils::parse_date)]
        from: chrono::NaiveDate,

        /// Last day, included (YYYY-MM-DD)
        #[arg(long, value_parser = utils::parse_date)]
        to: chrono::NaiveDate,

        /// Days per loaded window
        #[arg(long, default_value_t = commands::DEFAULT_STEP_DAYS)]
        step_days: u64,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which days of a range are still unexplored
    Gaps {
        /// Explored span (YYYY-MM-DD..YYYY-MM-DD), repeatable
        #[arg(long, value_parser = utils::parse_span)]
        explored: Vec<utils::DaySpan>,

        #[arg(long, value_parser = utils::parse_date)]
        from: chrono::NaiveDate,

        #[arg(long, value_parser = utils::parse_date)]
        to: chrono::NaiveDate,
    },
}

fn init_tracing(config: &CalViewConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CalViewConfig::load()?;
    init_tracing(&config);

    let tz: Tz = match &cli.timezone {
        Some(name) => name
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown timezone '{}'", name))?,
        None => config.tz()?,
    };

    match cli.command {
        Commands::Events {
            source,
            pending,
            calendar,
            from,
            to,
            step_days,
            json,
        } => {
            let args = EventsArgs {
                source,
                pending,
                calendar,
                from,
                to,
                step_days,
                json,
            };
            commands::events::run(args, &config, tz).await
        }
        Commands::Gaps { explored, from, to } => commands::gaps::run(&explored, from, to, tz),
    }
}
