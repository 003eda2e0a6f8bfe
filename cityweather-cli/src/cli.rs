use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cityweather_core::{
    Config, TemperatureUnit, TrackError, TrackOutcome, WeatherTracker, client_from_config,
    config::API_KEY_ENV, resolver_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tokio::task::JoinSet;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for the cities you track")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the WeatherAPI key, temperature unit and home city.
    Configure,

    /// Show current weather for one or more cities.
    Show {
        /// City names, e.g. "London" "São Paulo".
        #[arg(required_unless_present = "here")]
        cities: Vec<String>,

        /// Also track the current location.
        #[arg(long)]
        here: bool,

        /// Temperature unit: c or f. Defaults to the configured unit.
        #[arg(long, value_parser = parse_unit)]
        unit: Option<TemperatureUnit>,
    },

    /// Add cities one at a time and watch the list update.
    Interactive {
        /// Temperature unit: c or f. Defaults to the configured unit.
        #[arg(long, value_parser = parse_unit)]
        unit: Option<TemperatureUnit>,
    },
}

fn parse_unit(value: &str) -> Result<TemperatureUnit, String> {
    TemperatureUnit::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { cities, here, unit } => {
                let config = Config::load()?;
                let unit = unit.unwrap_or(config.unit);
                show(build_tracker(&config)?, cities, here, unit).await
            }
            Command::Interactive { unit } => {
                let config = Config::load()?;
                let unit = unit.unwrap_or(config.unit);
                interactive(build_tracker(&config)?, unit).await
            }
        }
    }
}

fn build_tracker(config: &Config) -> anyhow::Result<WeatherTracker> {
    let client = client_from_config(config, std::env::var(API_KEY_ENV).ok())?;
    let tracker = WeatherTracker::new(Arc::new(client));

    let resolver = resolver_from_config(config.location.as_ref())
        .context("Failed to set up location lookup")?;

    Ok(match resolver {
        Some(resolver) => tracker.with_resolver(Arc::from(resolver)),
        None => tracker,
    })
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI.com key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get a free key at https://www.weatherapi.com/signup.aspx")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let units = TemperatureUnit::all().to_vec();
    let cursor = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Temperature unit:", units).with_starting_cursor(cursor).prompt()?;

    let current_city =
        config.location.as_ref().and_then(|l| l.city.clone()).unwrap_or_default();
    let home_city = Text::new("Home city for --here (blank for none):")
        .with_initial_value(&current_city)
        .prompt()?;
    config.set_home_city(Some(home_city.trim().to_string()));

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(
    tracker: WeatherTracker,
    cities: Vec<String>,
    here: bool,
    unit: TemperatureUnit,
) -> anyhow::Result<()> {
    let current = async {
        if here {
            Some(tracker.track_current_location().await)
        } else {
            None
        }
    };
    let (current, results) = tokio::join!(current, tracker.track_all(cities));

    let mut failed = 0;
    let mut report = |query: &str, result: Result<TrackOutcome, TrackError>| {
        if let Some(msg) = render::describe_outcome(query, &result) {
            eprintln!("{msg}");
        }
        if result.is_err() {
            failed += 1;
        }
    };

    let total = results.len() + usize::from(current.is_some());
    if let Some(result) = current {
        report("current location", result);
    }
    for (city, result) in results {
        report(&city, result);
    }

    println!("{}", render::render_list(&tracker.store().all(), unit));

    if failed > 0 {
        anyhow::bail!("{failed} of {total} lookups failed");
    }
    Ok(())
}

const HERE_COMMAND: &str = ":here";

async fn interactive(tracker: WeatherTracker, unit: TemperatureUnit) -> anyhow::Result<()> {
    let mut sub = tracker.store().subscribe();
    let renderer = tokio::spawn(async move {
        while let Some(records) = sub.changed().await {
            println!("\n{}\n", render::render_list(&records, unit));
        }
    });

    let help = if tracker.has_resolver() {
        "Type a city, or :here for your location. Empty line to quit."
    } else {
        "Type a city. Empty line to quit."
    };

    let mut pending = JoinSet::new();
    loop {
        let input = tokio::task::spawn_blocking(move || {
            Text::new("City:").with_help_message(help).prompt()
        })
        .await?;

        let query = match input {
            Ok(query) if query.trim().is_empty() => break,
            Ok(query) => query.trim().to_string(),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let tracker = tracker.clone();
        pending.spawn(async move {
            let result = if query == HERE_COMMAND {
                tracker.track_current_location().await
            } else {
                tracker.track(&query).await
            };
            if let Some(msg) = render::describe_outcome(&query, &result) {
                eprintln!("{msg}");
            }
        });
    }

    while pending.join_next().await.is_some() {}
    drop(tracker);
    renderer.await?;

    Ok(())
}
