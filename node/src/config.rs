use anyhow::Result;
use config::{Config, File as ConfigFile};
use rumah_trainer::{BootstrapConfig, SearchConfig, TrainingParams};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MODEL_PATH: &str = "model.bin";
const DEFAULT_DATASET_PATH: &str = "dataset.xlsx";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub config_path: Option<PathBuf>,

    // HTTP
    pub host: String,
    pub port: u16,

    // Model lifecycle
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub search_iterations: usize,
    pub cv_folds: usize,
    pub seed: u64,

    // Observability
    pub prometheus_enabled: bool,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl AppConfig {
    /// Defaults, then the optional TOML file, then `RUMAH_*` environment
    /// variables.
    pub fn load(config_path_override: Option<&str>) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    anyhow::bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path)
            }
            None => None,
        };

        let mut builder = Config::builder();

        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }

        builder = builder.add_source(config::Environment::with_prefix("RUMAH"));

        let config = builder.build()?;

        let search_defaults = SearchConfig::default();

        Ok(Self {
            config_path: resolved_path,
            host: get_string_value(&config, &["host", "server.host"])
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: get_parsed_value(&config, &["port", "server.port"], DEFAULT_PORT)?,
            model_path: get_string_value(&config, &["model_path", "model.path"])
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            dataset_path: get_string_value(&config, &["dataset_path", "model.dataset_path"])
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
            search_iterations: get_parsed_value(
                &config,
                &["search_iterations", "training.search_iterations"],
                search_defaults.n_iter,
            )?,
            cv_folds: get_parsed_value(
                &config,
                &["cv_folds", "training.cv_folds"],
                search_defaults.cv,
            )?,
            seed: get_parsed_value(&config, &["seed", "training.seed"], search_defaults.seed)?,
            prometheus_enabled: get_bool_value(
                &config,
                &["prometheus_enabled", "metrics.enabled"],
                true,
            ),
            log_level: get_string_value(&config, &["log_level", "logging.level"])
                .unwrap_or_else(|| "info".to_string()),
            log_format: get_string_value(&config, &["log_format", "logging.format"])
                .unwrap_or_else(|| "pretty".to_string()),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("HOST must not be empty");
        }
        if self.port == 0 {
            anyhow::bail!("PORT must be greater than zero");
        }
        if self.model_path.as_os_str().is_empty() {
            anyhow::bail!("MODEL_PATH must not be empty");
        }
        if self.search_iterations == 0 {
            anyhow::bail!("SEARCH_ITERATIONS must be at least 1");
        }
        if self.cv_folds < 2 {
            anyhow::bail!("CV_FOLDS must be at least 2");
        }
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                self.log_format
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Startup model acquisition settings.
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            model_path: self.model_path.clone(),
            dataset_path: self.dataset_path.clone(),
            training: TrainingParams {
                split_seed: self.seed,
                search: SearchConfig {
                    n_iter: self.search_iterations,
                    cv: self.cv_folds,
                    seed: self.seed,
                    ..SearchConfig::default()
                },
                ..TrainingParams::default()
            },
        }
    }
}

fn get_string_value(config: &Config, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        config
            .get_string(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

fn get_bool_value(config: &Config, keys: &[&str], default: bool) -> bool {
    for key in keys {
        if let Ok(value) = config.get_bool(key) {
            return value;
        }
        if let Ok(raw) = config.get_string(key) {
            if let Ok(parsed) = raw.parse::<bool>() {
                return parsed;
            }
        }
    }
    default
}

fn get_parsed_value<T>(config: &Config, keys: &[&str], default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match keys
        .iter()
        .find_map(|key| get_string_value(config, &[*key]).map(|raw| (*key, raw)))
    {
        Some((key, raw)) => raw
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("invalid value '{raw}' for {key}: {err}")),
        None => Ok(default),
    }
}
