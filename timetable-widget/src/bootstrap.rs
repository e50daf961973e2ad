use crate::cli::ConfigCommand;
use crate::config::{ConfigKey, ConfigStore};
use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use strum::IntoEnumIterator;
use timetable_client::TimetableClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "timetable_widget=info,timetable_client=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The terminal belongs to the UI; log to a file next to the config.
    File,
    Stderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

pub fn init_logging(target: LogTarget) {
    let registry = tracing_subscriber::registry().with(env_filter());

    if target == LogTarget::File {
        match open_log_file() {
            Ok(file) => {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_ansi(false)
                            .with_writer(Mutex::new(file)),
                    )
                    .init();
                return;
            }
            // Without a log file, drop log output rather than draw over the UI.
            Err(_) => {
                registry.init();
                return;
            }
        }
    }

    registry
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_log_file() -> Result<std::fs::File> {
    let path = ConfigStore::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

pub fn open_store(path: Option<PathBuf>) -> Result<ConfigStore> {
    let path = match path {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };
    Ok(ConfigStore::load(path))
}

/// Build a client for the configured backend, falling back to the default
/// URL if the stored one cannot be used.
pub fn build_client(store: &ConfigStore) -> Result<TimetableClient> {
    match TimetableClient::new(store.backend_url()) {
        Ok(client) => Ok(client),
        Err(e) => {
            tracing::warn!("{}; falling back to the default backend", e);
            let fallback = crate::config::WidgetConfig::default().backend_url;
            TimetableClient::new(&fallback).context("Failed to build HTTP client")
        }
    }
}

fn parse_key(raw: &str) -> Result<ConfigKey> {
    ConfigKey::from_str(raw).map_err(|_| {
        let known: Vec<String> = ConfigKey::iter().map(|k| k.to_string()).collect();
        anyhow!("Unknown config key `{}` (expected one of: {})", raw, known.join(", "))
    })
}

pub fn run_config_command(action: ConfigCommand, mut store: ConfigStore) -> Result<()> {
    match action {
        ConfigCommand::Path => println!("{}", store.path().display()),
        ConfigCommand::Show => {
            for key in ConfigKey::iter() {
                println!("{} = {}", key, store.get(key));
            }
        }
        ConfigCommand::Get { key } => {
            let key = parse_key(&key)?;
            println!("{}", store.get(key));
        }
        ConfigCommand::Set { key, value } => {
            let key = parse_key(&key)?;
            let value = key.parse_value(&value)?;
            store.set(key, value)?;
            println!("{} = {}", key, store.get(key));
        }
        ConfigCommand::Position { x, y } => {
            store.set_position(x, y)?;
            println!("x = {}, y = {}", store.config().x, store.config().y);
        }
        ConfigCommand::Size { width, height } => {
            store.set_size(width, height)?;
            println!(
                "width = {}, height = {}",
                store.config().width,
                store.config().height
            );
        }
    }
    Ok(())
}

pub async fn print_remote_settings(store: &ConfigStore, reset_position: bool) -> Result<()> {
    let client = build_client(store)?;
    let settings = if reset_position {
        client.reset_position().await
    } else {
        client.get_settings().await
    };
    match settings {
        Some(settings) => println!("{}", serde_json::to_string_pretty(&settings)?),
        None => println!("unavailable"),
    }
    Ok(())
}
