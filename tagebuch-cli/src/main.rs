use clap::Parser;
use serde::Deserialize;
use std::{str::FromStr, time::Duration};
use tagebuch_client::client::{ApiClient, BuildClientError};
use tagebuch_common::gate::{GateKey, GateKeyDecodeError};
use tagebuch_store::store::PostStore;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Debug, Error)]
enum CliError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error parsing the configured gate key: {0}")]
    GateKey(#[from] GateKeyDecodeError),
    #[error(transparent)]
    Client(#[from] BuildClientError),
    #[error(transparent)]
    Command(#[from] commands::CommandError),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    gate_key: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:4000".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tagebuch_cli=debug,tagebuch_client=debug,\
                tagebuch_common=debug,tagebuch_store=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn get_env() -> Result<Env, CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::prefixed("TAGEBUCH_").from_env().map_err(CliError::from)
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    install_tracing();
    let env = get_env()?;
    let cli = commands::Cli::parse();

    let gate_key = env
        .gate_key
        .as_deref()
        .map(GateKey::from_str)
        .transpose()?;
    let client = ApiClient::new(
        env.base_url,
        Duration::from_secs(env.request_timeout_secs),
    )?;
    let store = PostStore::new(client);

    commands::run(cli.command, store, gate_key.as_ref()).await?;

    Ok(())
}
