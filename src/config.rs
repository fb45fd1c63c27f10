use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub commission: CommissionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionConfig {
    /// Seed value for the stored rate; the live rate is read from the
    /// settings table, so changing this does not affect an initialized
    /// database.
    pub default_rate: f64,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self { default_rate: 10.0 }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Fall back to environment variables when no config file exists
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = env::var("DATABASE_URL")
                    .map_err(|_| "DATABASE_URL must be set when config.toml is absent")?;

                Config {
                    server: ServerConfig {
                        host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DATABASE_MAX_CONNECTIONS", 5),
                    },
                    commission: CommissionConfig {
                        default_rate: get_env_parse("COMMISSION_DEFAULT_RATE", 10.0),
                    },
                }
            }
            Err(e) => return Err(Box::new(e)),
        };

        // Environment variables override file values
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }

        if !(0.0..=100.0).contains(&config.commission.default_rate) {
            return Err("commission.default_rate must be between 0 and 100".into());
        }

        Ok(config)
    }
}
