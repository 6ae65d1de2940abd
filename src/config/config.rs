use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use std::path::Path;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::api::ApiConfig;
use super::logging::LoggingConfig;
use super::session::SessionConfig;

/// Environment variables with this prefix override values from the YAML file.
/// Nested keys are separated by a double underscore, e.g. `SESSIONTRON_API__BASE_URL`.
pub const ENV_PREFIX: &str = "SESSIONTRON_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: where the API lives, how the session behaves, how we log.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "./config.yaml";

/// `path` merged with `SESSIONTRON_*` environment variables.
pub fn figment_for(path: impl AsRef<Path>) -> Figment {
    Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// The default figment: `./config.yaml` merged with `SESSIONTRON_*` environment variables.
pub fn default_figment() -> Figment {
    figment_for(DEFAULT_CONFIG_FILE)
}

/// Extract a versioned configuration from any figment.
pub fn load_config_from(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from "config.yaml" in the current directory plus environment overrides.
pub fn load_config() -> Result<ConfigV1, figment::Error> {
    load_config_from(default_figment())
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => eprintln!("Error rendering configuration schema: {}", e),
    }
}
