use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use std::{
    io::{self, BufRead, IsTerminal, Write},
    path::PathBuf,
    sync::Arc,
};
use weather_core::{
    Config, OpenWeatherClient, Pipeline, TracingSink, WeatherLog, input::try_collect_cities,
};

const CITY_PROMPT: &str = "Enter a city name (or type 'done' to finish):";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show and log current weather for one or more cities.
    Show {
        /// City names; prompts interactively when none are given.
        cities: Vec<String>,

        /// Append records to this file instead of the configured one.
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Use this API key instead of the configured one.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Print the location of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { cities, log_file, api_key } => {
                let mut config = Config::load()?;
                if let Some(key) = api_key {
                    config.set_api_key(&key)?;
                }
                if let Some(path) = log_file {
                    config.log_file = path;
                }
                show(&config, cities).await
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(&key)?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(config: &Config, cities: Vec<String>) -> anyhow::Result<()> {
    let sink = Arc::new(TracingSink);
    let fetcher = OpenWeatherClient::from_config(config, sink.clone())?;
    let pipeline = Pipeline::new(Box::new(fetcher), WeatherLog::new(&config.log_file), sink);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cities.is_empty() {
        pipeline.run(&cities, &mut out).await?;
        return Ok(());
    }

    writeln!(out, "Welcome to the Weather App!")?;
    out.flush()?;

    let cities = if io::stdin().is_terminal() {
        try_collect_cities(|| prompt_outcome(Text::new(CITY_PROMPT).prompt()))?
    } else {
        let mut lines = io::stdin().lock().lines();
        try_collect_cities(|| {
            lines.next().transpose().context("Failed to read city name from stdin")
        })?
    };

    pipeline.run_cities(cities, &mut out).await?;
    Ok(())
}

/// Maps one city prompt result onto the collector's contract: Esc ends input,
/// Ctrl-C aborts the whole run before anything is fetched.
fn prompt_outcome(result: Result<String, InquireError>) -> anyhow::Result<Option<String>> {
    match result {
        Ok(line) => Ok(Some(line)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(InquireError::OperationInterrupted) => bail!("Interrupted; no weather was fetched."),
        Err(err) => Err(err).context("Failed to read city name"),
    }
}
