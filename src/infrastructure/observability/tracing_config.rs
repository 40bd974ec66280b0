use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: Environment,
    pub default_level: String,
    pub json_format: bool,
}

impl TracingConfig {
    /// `LOG_FORMAT=json` forces JSON output regardless of settings.
    pub fn from_settings(settings: &LoggingSettings, environment: Environment) -> Self {
        let json_from_env = std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);
        Self {
            environment,
            default_level: settings.level.clone(),
            json_format: settings.enable_json || json_from_env,
        }
    }

    pub fn default_filter(&self) -> String {
        format!("warn,reportscan={}", self.default_level)
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingSettings::default(), Environment::Local)
    }
}
