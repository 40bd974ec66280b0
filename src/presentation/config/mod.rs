mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ExtractionSettings, ExtractorProvider, LoggingSettings, OcrSettings, Settings, SettingsError,
    VisionSettings,
};
