use anyhow::{Context, anyhow};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tracing::debug;

use weather_core::{
    Assistant, Config, Coordinate, IntentPipeline, LocationQuery, ProviderId, Session, Units,
    WeatherService,
    format::{format_dated, format_single},
    geolocation::{FixedPosition, IpLocator, PositionOptions, PositionSource},
    provider::{completion_client_from_config, weather_provider_from_config},
};

use crate::card;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Your latitude, used for distances and nearby suggestions.
    #[arg(long, global = true, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Your longitude.
    #[arg(long, global = true, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Look up your approximate position from your IP address.
    #[arg(long, global = true, conflicts_with = "lat")]
    pub locate: bool,

    /// Only use the built-in rule-based question parser.
    #[arg(long, global = true)]
    pub no_completion: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openweather" or "completion".
        provider: String,
    },

    /// Show weather for an address.
    Show {
        /// Address or location name.
        address: String,

        /// Forecast day (YYYY-MM-DD); if absent, means "now".
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        fahrenheit: bool,
    },

    /// Ask a single question.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Start an interactive conversation.
    Chat,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match &self.command {
            Command::Configure { provider } => configure(provider),
            Command::Show { address, date, fahrenheit } => {
                let units = if *fahrenheit { Units::Fahrenheit } else { Units::Celsius };
                self.show(address, *date, units).await
            }
            Command::Ask { question } => self.ask(&question.join(" ")).await,
            Command::Chat => self.chat().await,
        }
    }

    async fn show(&self, address: &str, date: Option<NaiveDate>, units: Units) -> anyhow::Result<()> {
        let config = Config::load()?;
        let service = WeatherService::from_openweather(weather_provider_from_config(&config)?);
        let user = self.user_position(&config)?.current_position(&PositionOptions::default()).await.ok();

        let weather = service
            .fetch_weather(&LocationQuery::Name(address.to_string()), user)
            .await
            .map_err(|e| anyhow!(e.user_message()))?;

        println!("{}\n", card::render(&weather, units));
        let today = Local::now().date_naive();
        match date {
            Some(date) => {
                println!("{}", format_dated(&weather, &weather.location.name, date, units, None, today))
            }
            None => println!("{}", format_single(&weather, "weather", units)),
        }
        Ok(())
    }

    async fn ask(&self, question: &str) -> anyhow::Result<()> {
        let config = Config::load()?;
        let position = self.user_position(&config)?;
        let mut session = match position.current_position(&PositionOptions::default()).await {
            Ok(at) => Session::with_position(at),
            Err(e) => {
                debug!("No user position: {}", e);
                Session::new()
            }
        };

        let assistant = self.assistant(&config, position)?;
        let outcome = assistant.handle_turn(&mut session, question).await;

        println!("{}", outcome.reply);
        if let Some(weather) = &outcome.card {
            println!("\n{}", card::render(weather, outcome.units));
        }
        Ok(())
    }

    async fn chat(&self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let assistant = self.assistant(&config, self.user_position(&config)?)?;

        let mut session = assistant.start_session().await;
        if let Some(weather) = session.displayed() {
            println!("{}\n", card::render(weather, Units::Celsius));
        }
        println!("Ask about the weather anywhere. Type \"exit\" to leave.");

        loop {
            let line = match Text::new("You:").prompt() {
                Ok(line) => line,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(e) => return Err(e).context("Failed to read input"),
            };

            let line = line.trim();
            if line.is_empty() || line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                break;
            }

            let outcome = assistant.handle_turn(&mut session, line).await;
            println!("{}", outcome.reply);
            if let Some(weather) = &outcome.card {
                println!("\n{}", card::render(weather, outcome.units));
            }
            println!();
        }

        Ok(())
    }

    fn assistant(&self, config: &Config, position: Box<dyn PositionSource>) -> anyhow::Result<Assistant> {
        let service = WeatherService::from_openweather(weather_provider_from_config(config)?);

        let intents = match completion_client_from_config(config) {
            Some(client) if !self.no_completion => IntentPipeline::with_primary(Box::new(client)),
            _ => IntentPipeline::rule_based(),
        };

        Ok(Assistant::new(service, intents, position)
            .with_defaults(config.default_location(), config.default_region()))
    }

    /// Flags win over `--locate`, which wins over the configured home position.
    fn user_position(&self, config: &Config) -> anyhow::Result<Box<dyn PositionSource>> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            let at = Coordinate::new(lat, lon)
                .ok_or_else(|| anyhow!("Coordinates out of range: {lat}, {lon}"))?;
            return Ok(Box::new(FixedPosition(Some(at))));
        }

        if self.locate {
            return Ok(Box::new(IpLocator::new()));
        }

        Ok(Box::new(FixedPosition(config.home_coordinate())))
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load_file()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.upsert_provider_api_key(id, api_key.trim().to_string());

    if id == ProviderId::Completion {
        let base_url = Text::new("Base URL (empty for default):")
            .prompt()
            .context("Failed to read base URL")?;
        let model = Text::new("Model (empty for default):").prompt().context("Failed to read model")?;
        config.set_provider_endpoint(id, Some(base_url.trim().to_string()), Some(model.trim().to_string()));
    }

    config.save()?;
    println!("Saved {id} settings to {}", Config::config_file_path()?.display());
    Ok(())
}
