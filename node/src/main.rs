use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rumah_core::Predictor;
use rumah_rpc::{start_server, AppInfo, AppState};
use rumah_trainer::load_or_train;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod version;

use config::AppConfig;
use version::{git_commit_hash, RUMAH_VERSION};

fn cli() -> Command {
    Command::new("rumah-node")
        .version(RUMAH_VERSION)
        .about("House-price prediction service")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (TOML)"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Override HTTP bind host"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .value_parser(value_parser!(u16))
                .help("Override HTTP port"),
        )
        .arg(
            Arg::new("model-path")
                .long("model-path")
                .value_name("FILE")
                .help("Model file to load, or to write after training"),
        )
        .arg(
            Arg::new("dataset-path")
                .long("dataset-path")
                .value_name("FILE")
                .help("Dataset used when no usable model file exists"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Override the log level"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .value_parser(["pretty", "json"])
                .help("Select log output format"),
        )
        .arg(
            Arg::new("disable-metrics")
                .long("disable-metrics")
                .action(ArgAction::SetTrue)
                .help("Disable the Prometheus metrics recorder"),
        )
}

fn load_config_with_overrides(matches: &clap::ArgMatches) -> Result<AppConfig> {
    let config_path = matches
        .get_one::<String>("config")
        .map(|value| value.as_str());
    let mut config = AppConfig::load(config_path)?;
    apply_overrides(matches, &mut config);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(matches: &clap::ArgMatches, config: &mut AppConfig) {
    if let Some(host) = matches.get_one::<String>("host") {
        config.host = host.clone();
    }

    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }

    if let Some(model_path) = matches.get_one::<String>("model-path") {
        config.model_path = PathBuf::from(model_path);
    }

    if let Some(dataset_path) = matches.get_one::<String>("dataset-path") {
        config.dataset_path = PathBuf::from(dataset_path);
    }

    if let Some(log_level) = matches.get_one::<String>("log-level") {
        config.log_level = log_level.clone();
    }

    if let Some(log_format) = matches.get_one::<String>("log-format") {
        config.log_format = log_format.clone();
    }

    if matches.get_flag("disable-metrics") {
        config.prometheus_enabled = false;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config_with_overrides(&matches)?;

    init_logging(&config)?;
    info!(
        "Rumah house-price service {} (commit {})",
        RUMAH_VERSION,
        git_commit_hash()
    );
    if let Some(path) = &config.config_path {
        info!("Loaded configuration from {}", path.display());
    }

    let metrics_handle = init_metrics(&config);

    // The listener is only bound once a model is in hand.
    let bootstrap = config.bootstrap_config();
    let booted = tokio::task::spawn_blocking(move || load_or_train(&bootstrap))
        .await
        .context("model bootstrap task failed")?
        .context("no model available: loading and training both failed")?;

    info!(
        "Model ready ({}): {} trees, {} nodes",
        booted.source,
        booted.model.trees.len(),
        booted.model.node_count()
    );

    let app_info = AppInfo {
        version: RUMAH_VERSION.to_string(),
        commit: git_commit_hash().to_string(),
        model_source: booted.source.to_string(),
    };
    gauge!(
        "app_info",
        "version" => app_info.version.clone(),
        "commit" => app_info.commit.clone(),
        "model_source" => app_info.model_source.clone()
    )
    .set(1.0);

    let state =
        AppState::new(Predictor::new(booted.model), app_info).with_metrics(metrics_handle);
    let addr = config.bind_addr();

    tokio::select! {
        result = start_server(state, &addr) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}

fn init_metrics(config: &AppConfig) -> Option<PrometheusHandle> {
    if !config.prometheus_enabled {
        info!("Prometheus metrics recorder disabled via configuration");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder registered");
            describe_counter!("http_requests_total", "HTTP requests handled, by endpoint");
            describe_counter!(
                "predictions_total",
                "Prediction requests, by outcome (ok or error)"
            );
            describe_gauge!("app_info", "Application information");
            Some(handle)
        }
        Err(err) => {
            warn!("Failed to install Prometheus metrics recorder: {}", err);
            None
        }
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let matches = cli().get_matches_from([
            "rumah-node",
            "--port",
            "8081",
            "--model-path",
            "/tmp/rumah/model.bin",
            "--log-format",
            "json",
            "--disable-metrics",
        ]);
        let config = load_config_with_overrides(&matches).unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.model_path, PathBuf::from("/tmp/rumah/model.bin"));
        assert_eq!(config.log_format, "json");
        assert!(!config.prometheus_enabled);
    }

    #[test]
    fn test_cli_rejects_unknown_log_format() {
        assert!(cli()
            .try_get_matches_from(["rumah-node", "--log-format", "xml"])
            .is_err());
    }
}
