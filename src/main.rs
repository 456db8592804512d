mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod report;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use dialoguer::Confirm;
use logic::window::AnalysisWindow;
use logic::AdvisoryService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Advise);

    if command == Commands::Init {
        if Config::exists(cli.config.as_ref()) {
            let overwrite = Confirm::new()
                .with_prompt("A configuration already exists. Overwrite it?")
                .default(false)
                .interact()
                .context("Interactive setup failed")?;
            if !overwrite {
                return Ok(());
            }
        }

        Config::setup_interactive(cli.config).context("Interactive setup failed")?;
        println!("Run `orchardops check` to test the connections.");
        return Ok(());
    }

    let config = match Config::load(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run `orchardops init` to create a configuration.");
            std::process::exit(1);
        }
    };
    let window_end = config.analysis.window_end;

    let service = AdvisoryService::new(config).context("Failed to initialize data sources")?;

    let output = match command {
        Commands::Advise => {
            let advisory = service.advise(Utc::now()).await;
            if cli.json {
                report::to_json(&advisory)?
            } else {
                report::render_advisory(&advisory)
            }
        }
        Commands::Risk { days } => {
            let today = Local::now().date_naive();
            let risk = match days {
                Some(days) => {
                    service
                        .risk_report_for(AnalysisWindow::new(days.max(1), window_end), today)
                        .await
                }
                None => service.risk_report(today).await,
            }
            .context("Failed to fetch sensor history")?;

            if cli.json {
                report::to_json(&risk)?
            } else {
                report::render_risk_report(&risk)
            }
        }
        Commands::Forecast { hours } => {
            let mut forecast = service
                .forecast()
                .await
                .context("Failed to fetch forecast")?;
            if let Some(hours) = hours {
                forecast.entries = forecast
                    .next_hours(Utc::now(), hours)
                    .into_iter()
                    .cloned()
                    .collect();
            }

            if cli.json {
                report::to_json(&forecast)?
            } else {
                report::render_forecast(&forecast)
            }
        }
        Commands::Check => {
            if !cli.json {
                println!("Configuration OK");
            }
            let status = service.check_connections().await;
            let output = if cli.json {
                report::to_json(&status)?
            } else {
                report::render_connections(&status, &service.engine().list_rules())
            };
            if !status.all_connected() {
                print!("{}", output);
                std::process::exit(1);
            }
            output
        }
        Commands::Init => unreachable!("handled before config load"),
    };

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Keep stdout clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
