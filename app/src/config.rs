use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::*;
use serde::Deserialize;
use url::Url;

use crate::editor::HttpFoodApi;
use infra::storage::{FileStorage, MemoryStorage, Storage};

const ENV_PREFIX: &str = "FOODCART_";

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    pub api: Option<ApiConfig>,
}

/// Where the session's slots live; without a path they only last as long as
/// the process.
#[derive(Deserialize, Debug, Default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiConfig {
    pub url: Url,
}

#[derive(Deserialize, Debug, Default)]
struct EnvOverrides {
    api_url: Option<Url>,
    storage_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
pub struct EnvLogger {
    level: Option<LogLevel>,
    #[serde(default)]
    modules: HashMap<String, LogLevel>,
    #[serde(default)]
    timestamp_nanos: bool,
}

impl Config {
    pub fn from_toml(src: &str) -> Result<Self> {
        let config = toml::from_str(src).context("parse config")?;
        Ok(config)
    }

    /// Lets `FOODCART_API_URL` and `FOODCART_STORAGE_PATH` win over the file.
    pub fn apply_env(&mut self) -> Result<()> {
        let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX)
            .from_env()
            .context("read environment overrides")?;
        self.apply(overrides);
        Ok(())
    }

    fn apply(&mut self, overrides: EnvOverrides) {
        if let Some(url) = overrides.api_url {
            debug!("Api url from environment: {}", url);
            self.api = Some(ApiConfig { url });
        }
        if let Some(path) = overrides.storage_path {
            debug!("Storage path from environment: {:?}", path);
            self.storage.path = Some(path);
        }
    }
}

impl StorageConfig {
    pub fn build(&self) -> Box<dyn Storage> {
        debug!("Build storage from {:?}", self);
        match self.path.as_ref() {
            Some(path) => Box::new(FileStorage::new(path)),
            None => Box::new(MemoryStorage::new()),
        }
    }
}

impl ApiConfig {
    pub fn build(&self) -> Result<HttpFoodApi> {
        let api = HttpFoodApi::new(self.url.clone()).context("build http client")?;
        Ok(api)
    }
}

impl LogLevel {
    fn to_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level.as_ref() {
            b.filter_level(level.to_filter());
        }

        for (module, level) in self.modules.iter() {
            b.filter_module(&module, level.to_filter());
        }

        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }

        b
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Deserialize, Debug)]
    struct Whole {
        #[serde(flatten)]
        foodcart: Config,
        env_logger: EnvLogger,
    }

    const SAMPLE: &str = r#"
        [storage]
        path = "/tmp/foodcart-session"

        [api]
        url = "http://localhost:8080/api/foods"

        [env_logger]
        level = "info"
        timestamp_nanos = true
        [env_logger.modules]
        foodcart = "debug"
    "#;

    #[test]
    fn parses_sample_config() {
        let whole: Whole = toml::from_str(SAMPLE).expect("parse");
        assert_eq!(
            whole.foodcart.storage.path,
            Some(PathBuf::from("/tmp/foodcart-session"))
        );
        assert_eq!(
            whole.foodcart.api.map(|a| a.url.to_string()),
            Some("http://localhost:8080/api/foods".to_string())
        );
        assert!(whole.env_logger.timestamp_nanos);
        assert!(whole.env_logger.modules.contains_key("foodcart"));
    }

    #[test]
    fn everything_is_optional() {
        let config = Config::from_toml("").expect("parse");
        assert_eq!(config.storage.path, None);
        assert!(config.api.is_none());
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut config = Config::from_toml(SAMPLE).expect("parse");
        let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX)
            .from_iter(vec![
                ("FOODCART_API_URL".to_string(), "https://food.example/v2".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ])
            .expect("overrides");
        config.apply(overrides);

        assert_eq!(
            config.api.map(|a| a.url.to_string()),
            Some("https://food.example/v2".to_string())
        );
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/foodcart-session"))
        );
    }

    #[test]
    fn should_reject_bad_api_url() {
        let result = Config::from_toml("[api]\nurl = \"not a url\"\n");
        assert!(result.is_err(), "{:?}", result);
    }
}
