use std::path::Path;
use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;

use crate::application::services::{ChunkingPolicy, ExtractorConfig, ProcessOptions};
use crate::domain::ExtractionMethod;

use super::Environment;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("environment: {0}")]
    Environment(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub extraction: ExtractionSettings,
}

impl Settings {
    /// Loads `appsettings.{Environment}` from `dir` (optional, any format the
    /// `config` crate understands) and overlays `APP__`-style environment
    /// variables, e.g. `APP_EXTRACTION__OCR__API_KEY`.
    pub fn load(dir: &Path, environment: Environment) -> Result<Self, SettingsError> {
        let base = dir.join(environment.settings_file_stem());
        let base = base.to_string_lossy();

        let configuration = Config::builder()
            .add_source(File::with_name(&base).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(configuration.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorProvider {
    Azure,
    #[serde(rename = "openai")]
    OpenAi,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub min_file_size_bytes: u64,
    pub max_file_size_mb: u64,
    pub preferred_method: ExtractionMethod,
    pub fallback_enabled: bool,
    pub timeout_ms: u64,
    pub ocr_page_limit: u32,
    pub max_chunk_size: u32,
    pub inter_chunk_delay_ms: u64,
    pub ocr: OcrSettings,
    pub vision: VisionSettings,
}

impl ExtractionSettings {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn chunking_policy(&self) -> ChunkingPolicy {
        ChunkingPolicy {
            ocr_page_limit: self.ocr_page_limit,
            max_chunk_size: self.max_chunk_size,
            inter_chunk_delay: Duration::from_millis(self.inter_chunk_delay_ms),
        }
    }

    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            preferred_method: self.preferred_method,
            fallback_enabled: self.fallback_enabled,
            timeout: Duration::from_millis(self.timeout_ms),
            ..ProcessOptions::default()
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_file_size_bytes: 100,
            max_file_size_mb: 50,
            preferred_method: ExtractionMethod::Hybrid,
            fallback_enabled: true,
            timeout_ms: 180_000,
            ocr_page_limit: 30,
            max_chunk_size: 15,
            inter_chunk_delay_ms: 1_000,
            ocr: OcrSettings::default(),
            vision: VisionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub provider: ExtractorProvider,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub retries: u32,
}

impl OcrSettings {
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::new(self.retries, self.model.clone(), 0)
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            provider: ExtractorProvider::Azure,
            endpoint: None,
            api_key: None,
            model: "prebuilt-layout".to_string(),
            retries: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub provider: ExtractorProvider,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub retries: u32,
}

impl VisionSettings {
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::new(self.retries, self.model.clone(), self.max_tokens)
    }
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            provider: ExtractorProvider::OpenAi,
            base_url: Some("https://api.openai.com".to_string()),
            api_key: None,
            model: "gpt-4o".to_string(),
            max_tokens: 8192,
            retries: 2,
        }
    }
}
