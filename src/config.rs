use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serpent_pathfinding::ServiceConfig;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub grid: GridSettings,
    pub service: ServiceSettings,
    pub demo: DemoSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSettings {
    pub size_x: i32,
    pub size_y: i32,
    pub tile_size: f32,
    #[serde(default)]
    pub obstacle_density: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    pub tick_ms: u64,
    pub channel_capacity: usize,
}

impl From<&ServiceSettings> for ServiceConfig {
    fn from(settings: &ServiceSettings) -> Self {
        ServiceConfig {
            tick: Duration::from_millis(settings.tick_ms),
            channel_capacity: settings.channel_capacity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoSettings {
    pub steps: u32,
    pub seed: u64,
}

pub fn load_config() -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix("SERPENT").separator("__"))
        .build()
        .and_then(|config| config.try_deserialize::<Settings>());

    match settings {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
pub fn parse_config(toml: &str) -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}
