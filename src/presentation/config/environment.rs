use std::fmt;
use std::str::FromStr;

/// Deployment the CLI runs in. Picks the `appsettings.{Environment}` file
/// layered under the `APP_` variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Test,
    Prod,
}

impl Environment {
    pub const VARIABLE: &'static str = "APP_ENVIRONMENT";

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "Local",
            Environment::Test => "Test",
            Environment::Prod => "Prod",
        }
    }

    /// File stem handed to the `config` crate, which tries every format it
    /// knows, e.g. `appsettings.Prod.toml`.
    pub fn settings_file_stem(&self) -> String {
        format!("appsettings.{}", self.as_str())
    }

    /// An unset or blank value means a developer machine.
    pub fn resolve(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::trim) {
            None | Some("") => Ok(Environment::Local),
            Some(name) => name.parse(),
        }
    }

    pub fn from_env() -> Result<Self, String> {
        Self::resolve(std::env::var(Self::VARIABLE).ok().as_deref())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Environment::Local),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(format!(
                "{} must be local, test or prod, got {name:?}",
                Self::VARIABLE
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
