// Runtime configuration: built-in defaults, then `court_report.toml`, then
// `COURT_REPORT_*` environment variables (`__` separates nested keys).
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "court_report.toml";
pub const ENV_PREFIX: &str = "COURT_REPORT_";

#[derive(Debug, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,
    #[serde(default = "default_sheet")]
    pub sheet: String,
}

fn default_path() -> PathBuf {
    PathBuf::from("data.xlsx")
}

fn default_sheet() -> String {
    "Tooli".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            sheet: default_sheet(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_password")]
    pub password: Secret<String>,
}

fn default_password() -> Secret<String> {
    Secret::new("court2026".to_string())
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: default_password(),
        }
    }
}

/// Logging setup.
#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn empty_sources_give_defaults() {
        let config = AppConfig::from_figment(Figment::new()).unwrap();
        assert_eq!(config.data.path, PathBuf::from("data.xlsx"));
        assert_eq!(config.data.sheet, "Tooli");
        assert_eq!(config.auth.password.expose_secret(), "court2026");
        assert_eq!(config.telemetry.log_level, "warn");
        assert!(!config.telemetry.json);
    }

    #[test]
    fn toml_overrides_individual_keys() {
        let toml = r#"
            [data]
            path = "inventory.csv"

            [telemetry]
            json = true
        "#;
        let config = AppConfig::from_figment(Figment::from(Toml::string(toml))).unwrap();
        assert_eq!(config.data.path, PathBuf::from("inventory.csv"));
        assert_eq!(config.data.sheet, "Tooli");
        assert!(config.telemetry.json);
    }

    #[test]
    fn password_is_redacted_in_debug_output() {
        let toml = "[auth]\npassword = \"hunter2\"\n";
        let config = AppConfig::from_figment(Figment::from(Toml::string(toml))).unwrap();
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("hunter2"));
    }
}
