use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use weatherdash_core::{
    Config, DashboardRequest, OpenWeatherClient, TemperatureUnit, refresh,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather analytics dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Location name, optionally qualified ("London,GB"). Prompts when omitted.
    location: Option<String>,

    /// Temperature unit: celsius or fahrenheit.
    #[arg(long, short)]
    unit: Option<String>,

    /// Second location to compare against.
    #[arg(long)]
    compare: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and dashboard defaults.
    Configure,

    /// Render the dashboard once.
    Show {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Re-render the dashboard on a fixed cadence.
    Watch {
        #[command(flatten)]
        view: ViewArgs,

        /// Seconds between renders.
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),

            Command::Show { view } => {
                let config = Config::load()?;
                let (client, request) = prepare(&config, view)?;

                let snapshot = refresh(&client, &request).await.with_context(|| {
                    format!("Could not render dashboard for '{}'", request.location)
                })?;

                render::snapshot(&snapshot, request.unit);
                Ok(())
            }

            Command::Watch { view, interval } => {
                let config = Config::load()?;
                let (client, request) = prepare(&config, view)?;
                watch(client, request, interval).await
            }
        }
    }
}

/// Resolve credential, unit, and location into a concrete request.
fn prepare(config: &Config, view: ViewArgs) -> Result<(OpenWeatherClient, DashboardRequest)> {
    let api_key = config.api_key()?;
    let client = OpenWeatherClient::new(api_key)?;

    let unit = match view.unit.as_deref() {
        Some(s) => TemperatureUnit::try_from(s)?,
        None => config.default_unit,
    };

    let location = match view.location {
        Some(l) => l,
        None => prompt_location(config)?,
    };

    Ok((
        client,
        DashboardRequest {
            location,
            unit,
            compare: view.compare,
        },
    ))
}

fn prompt_location(config: &Config) -> Result<String> {
    const CUSTOM: &str = "Other…";

    let mut options = config.prompt_locations();
    options.push(CUSTOM.to_string());

    let choice = inquire::Select::new("Location:", options)
        .prompt()
        .context("Failed to read location choice")?;

    if choice == CUSTOM {
        let custom = inquire::Text::new("Location name:")
            .prompt()
            .context("Failed to read location")?;
        Ok(custom.trim().to_string())
    } else {
        Ok(choice)
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(key);

    let unit_choice = inquire::Select::new("Default temperature unit:", vec!["celsius", "fahrenheit"])
        .prompt()
        .context("Failed to read unit choice")?;
    config.default_unit = TemperatureUnit::try_from(unit_choice)?;

    let saved = inquire::Text::new("Saved locations (comma-separated, blank to keep current):")
        .prompt()
        .context("Failed to read saved locations")?;
    if !saved.trim().is_empty() {
        config.saved_locations = saved
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

/// Re-run the whole pipeline on a fixed cadence, discarding prior results.
/// The loop owns no pipeline state; a failed cycle halts that render and
/// the next tick starts from scratch.
async fn watch(client: OpenWeatherClient, request: DashboardRequest, interval_secs: u64) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        ticker.tick().await;

        match refresh(&client, &request).await {
            Ok(snapshot) => render::snapshot(&snapshot, request.unit),
            Err(err) => eprintln!("Refresh for '{}' failed: {err}", request.location),
        }
    }
}
