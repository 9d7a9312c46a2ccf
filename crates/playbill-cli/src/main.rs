use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use playbill::config::{self, Config};
use playbill::format::format_schedule;
use playbill::monitor;
use playbill::notifier::Notifier;
use playbill::WebScraper;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const BACKOFF_BASE_SECS: u64 = 1;
const MAX_RETRIES: u32 = 3;
const NOTIFIER_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(name = "playbill")]
#[command(about = "A theatre schedule monitor and Telegram notifier", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        short = 'c',
        long = "config",
        default_value = "theatres.yaml",
        global = true,
        help = "Path to the theatres configuration file"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape all configured theatres and push their schedules to Telegram
    Run,
    /// Scrape all configured theatres and print the results without notifying
    Parse {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

/// Telegram credentials taken from the environment. Both are required
/// before any scraping starts.
fn check_env_vars() -> Result<(String, String), String> {
    match (std::env::var("BOT_ID"), std::env::var("CHAT_ID")) {
        (Ok(bot_id), Ok(chat_id)) => Ok((bot_id, chat_id)),
        (bot_id, chat_id) => {
            let mut missing = Vec::new();
            if bot_id.is_err() {
                missing.push("BOT_ID");
            }
            if chat_id.is_err() {
                missing.push("CHAT_ID");
            }
            Err(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ))
        }
    }
}

fn load_config_or_exit(path: &Path) -> Config {
    config::load_config(path).unwrap_or_else(|e| {
        log::error!("Error loading configuration: {}", e);
        process::exit(1);
    })
}

fn build_scraper_or_exit() -> WebScraper {
    WebScraper::new(REQUEST_TIMEOUT_SECS, BACKOFF_BASE_SECS, MAX_RETRIES).unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    })
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

async fn run(config_path: &Path) {
    let (bot_id, chat_id) = check_env_vars().unwrap_or_else(|e| {
        log::error!("{}", e);
        process::exit(1);
    });

    let cfg = load_config_or_exit(config_path);
    let tz = cfg.general.display_offset().unwrap_or_else(|e| {
        log::error!("Error in configuration: {}", e);
        process::exit(1);
    });

    let scraper = build_scraper_or_exit();
    let notifier = Notifier::new(NOTIFIER_TIMEOUT_SECS).unwrap_or_else(|e| {
        log::error!("Error creating notifier: {}", e);
        process::exit(1);
    });

    // Setup is done; from here on nothing aborts the run. A broken site or
    // a dropped notification is logged and the remaining theatres proceed.
    log::info!("Start parsing theatres");
    let schedules = monitor::parse_all(&cfg, &scraper).await;
    log::info!("Finished parsing theatres");

    for schedule in &schedules {
        let time_parseable = cfg
            .theatres
            .iter()
            .find(|t| t.name == schedule.name)
            .is_some_and(|t| t.time_parseable);

        log::info!("Processing theatre: {}", schedule.name);
        let body = format_schedule(&schedule.shows, tz, time_parseable);
        let message = format!("<b>{}</b>\n\n{}", schedule.name, body);

        if notifier.send_message(&bot_id, &chat_id, &message).await {
            log::info!("Sent schedule for theatre: {}", schedule.name);
        } else {
            log::warn!("Failed to send schedule for theatre: {}", schedule.name);
        }
    }
}

async fn parse(config_path: &Path, format: OutputFormat) {
    let cfg = load_config_or_exit(config_path);
    let scraper = build_scraper_or_exit();

    let schedules = monitor::parse_all(&cfg, &scraper).await;

    match format {
        OutputFormat::Json => serialize_json(&schedules),
        OutputFormat::Text => {
            if schedules.is_empty() {
                println!("No theatres parsed.");
            }
            for schedule in &schedules {
                println!("{} ({} shows)", schedule.name, schedule.shows.len());
                for show in &schedule.shows {
                    println!(
                        "  - {} | {} | {}",
                        show.datetime,
                        show.title,
                        show.link.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    dotenvy::dotenv().ok();

    log::info!("Starting the monitoring script...");

    match cli.command {
        Commands::Run => run(&cli.config).await,
        Commands::Parse { format } => parse(&cli.config, format).await,
    }

    log::info!("Monitoring script finished.");
}
