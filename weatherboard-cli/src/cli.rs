use std::{io, process::ExitCode};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use tracing::{debug, info};
use weatherboard_core::{
    Config, Location, Theme, cities_for, config::API_KEY_ENV, countries, provider_from_config,
};

use crate::render::Renderer;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherboard", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, default location and theme.
    Configure,

    /// Show the dashboard for a city.
    Show {
        /// City name, e.g. "London". Prompts when absent and no default is configured.
        city: Option<String>,

        /// Country the city belongs to; narrows the interactive city prompt.
        #[arg(long)]
        country: Option<String>,

        /// Override the configured theme ("classic" or "dark").
        #[arg(long)]
        theme: Option<Theme>,

        /// Print the normalized report as JSON instead of the dashboard.
        #[arg(long)]
        json: bool,
    },

    /// List the supported countries and cities.
    Cities {
        #[arg(long)]
        country: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, country, theme, json } => {
                let config = Config::load()?;
                let location = resolve_location(
                    city.as_deref(),
                    country.as_deref(),
                    config.default_location.as_ref(),
                    prompt_location,
                )?;
                show(&config, &location, theme.unwrap_or(config.theme), json).await
            }
            Command::Cities { country } => {
                list_cities(&mut io::stdout().lock(), country.as_deref())?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(config: &Config, location: &Location, theme: Theme, json: bool) -> Result<ExitCode> {
    let provider = provider_from_config(config)?;
    info!(%location, "Fetching weather");

    let renderer = Renderer::new(theme);
    match provider.fetch(&location.city).await {
        Ok(report) => {
            if json {
                let body = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize weather report")?;
                println!("{body}");
            } else {
                renderer.render_report(&mut io::stdout().lock(), &report)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            renderer.render_error(&mut io::stderr().lock(), &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Pick the location from arguments, then the configured default, then `prompt`.
fn resolve_location(
    city: Option<&str>,
    country: Option<&str>,
    default: Option<&Location>,
    prompt: impl FnOnce(Option<&str>) -> Result<Location>,
) -> Result<Location> {
    match (city, country) {
        (Some(city), Some(country)) => Location::new(country, city),
        (Some(city), None) => Location::from_city(city),
        (None, Some(country)) => prompt(Some(country)),
        (None, None) => match default {
            Some(location) => {
                debug!(%location, "Using configured default location");
                Ok(location.clone())
            }
            None => prompt(None),
        },
    }
}

/// Ask for a country (unless given) and then one of its cities.
fn prompt_location(country: Option<&str>) -> Result<Location> {
    let country = match country {
        Some(country) => country.to_string(),
        None => Select::new("🌐 Country", countries())
            .prompt()
            .context("Country selection cancelled")?
            .to_string(),
    };

    let cities = cities_for(&country).ok_or_else(|| {
        anyhow!("Unknown country '{country}'. Supported countries: {}.", countries().join(", "))
    })?;

    let city = Select::new("🏙️ City", cities).prompt().context("City selection cancelled")?;

    Location::new(&country, city)
}

fn configure() -> Result<ExitCode> {
    let mut config = Config::load()?;

    if std::env::var(API_KEY_ENV).is_ok() {
        println!("{API_KEY_ENV} is set and takes precedence over a stored key.");
    }

    let key = Password::new("WeatherAPI.com key (Esc to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt_skippable()
        .context("Failed to read API key")?;
    if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        config.api_key = Some(key);
    }

    config.default_location = Some(prompt_location(None)?);

    let theme = Select::new("🎨 Theme", Theme::all().to_vec())
        .with_starting_cursor(Theme::all().iter().position(|t| *t == config.theme).unwrap_or(0))
        .prompt()
        .context("Theme selection cancelled")?;
    config.theme = theme;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(ExitCode::SUCCESS)
}

fn list_cities<W: io::Write>(out: &mut W, country: Option<&str>) -> Result<()> {
    let selected = match country {
        Some(country) => {
            cities_for(country).ok_or_else(|| {
                anyhow!(
                    "Unknown country '{country}'. Supported countries: {}.",
                    countries().join(", ")
                )
            })?;
            vec![country]
        }
        None => countries(),
    };

    for country in selected {
        let cities = cities_for(country).unwrap_or_default();
        writeln!(out, "{country}: {}", cities.join(", "))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_prompt(_: Option<&str>) -> Result<Location> {
        panic!("prompt must not be reached");
    }

    #[test]
    fn city_and_country_arguments_win() {
        let default = Location::new("UK", "London").unwrap();
        let loc =
            resolve_location(Some("Delhi"), Some("India"), Some(&default), no_prompt).unwrap();
        assert_eq!(loc, Location::new("India", "Delhi").unwrap());
    }

    #[test]
    fn city_alone_is_looked_up() {
        let loc = resolve_location(Some("Houston"), None, None, no_prompt).unwrap();
        assert_eq!(loc.country, "USA");
    }

    #[test]
    fn mismatched_country_is_rejected() {
        let err = resolve_location(Some("Houston"), Some("UK"), None, no_prompt).unwrap_err();
        assert!(err.to_string().contains("not available for UK"));
    }

    #[test]
    fn default_location_used_without_arguments() {
        let default = Location::new("Sri Lanka", "Galle").unwrap();
        let loc = resolve_location(None, None, Some(&default), no_prompt).unwrap();
        assert_eq!(loc, default);
    }

    #[test]
    fn prompt_gets_country_hint() {
        let loc = resolve_location(None, Some("UK"), None, |country| {
            assert_eq!(country, Some("UK"));
            Location::new("UK", "Bristol")
        })
        .unwrap();
        assert_eq!(loc.city, "Bristol");
    }

    #[test]
    fn prompt_used_when_nothing_else_available() {
        let loc = resolve_location(None, None, None, |country| {
            assert!(country.is_none());
            Location::new("India", "Mumbai")
        })
        .unwrap();
        assert_eq!(loc.city, "Mumbai");
    }

    #[test]
    fn list_cities_prints_catalog() {
        let mut buf = Vec::new();
        list_cities(&mut buf, None).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(out.lines().count(), 4);
        assert!(out.starts_with("India: Bangalore, Delhi, Kolkata, Mumbai\n"));
    }

    #[test]
    fn list_cities_for_unknown_country_fails() {
        let mut buf = Vec::new();
        assert!(list_cities(&mut buf, Some("Narnia")).is_err());
    }

    #[test]
    fn cli_parses_show_flags() {
        let cli =
            Cli::parse_from(["weatherboard", "show", "New York", "--theme", "dark", "--json"]);
        match cli.command {
            Command::Show { city, theme, json, .. } => {
                assert_eq!(city.as_deref(), Some("New York"));
                assert_eq!(theme, Some(Theme::Dark));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
