#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Deletes all exercises ahead of a re-import.

use clap::Parser;
use envconfig::Envconfig;
use eyre::Result;

use cli::Args;
use config::{Config, StoreSettings};
use error::Error;
use runner::{ResetRunner, RunStatus};
use storage::{PgStore, RestStore, Store};

mod cli;
mod config;
mod error;
mod runner;
#[cfg(test)]
mod test_utils;

fn load_config(args: &Args) -> Result<Config, Error> {
    match &args.config_path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::init_from_env()?),
    }
}

async fn connect(settings: StoreSettings) -> Result<Box<dyn Store>, Error> {
    let store: Box<dyn Store> = match settings {
        StoreSettings::Postgres { database_url } => {
            Box::new(PgStore::connect(&database_url).await?)
        }
        StoreSettings::Rest { url, api_key } => Box::new(RestStore::new(url, &api_key)?),
    };

    Ok(store)
}

async fn reset(args: &Args) -> RunStatus {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            // The table name lives in the config that failed to load.
            vlog::error!("Unexpected error while loading the reset configuration: {e}");

            return RunStatus::Failed;
        }
    };

    vlog::info!("Using the {} backend", config.backend);

    let store = match config.store_settings() {
        Ok(settings) => connect(settings).await,
        Err(e) => Err(e),
    };

    match store {
        Ok(store) => {
            ResetRunner::new(store.as_ref(), &config.table)
                .dry_run(args.dry_run)
                .run()
                .await
        }
        Err(e) => runner::unexpected(&config.table, &e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    dotenvy::dotenv().ok();

    let _sentry_guard = vlog::init();

    let status = reset(&args).await;

    vlog::debug!("Reset finished: {status:?}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::PathBuf};

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use crate::{
        cli::Args,
        reset,
        runner::RunStatus,
        test_utils::{assert_lines, Logs},
    };

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    fn args(config_path: PathBuf) -> Args {
        Args {
            config_path: Some(config_path),
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn missing_database_url_is_logged_not_raised() {
        let (logs, _guard) = Logs::capture();
        let file = config_file("");

        let status = reset(&args(file.path().to_path_buf())).await;

        assert_eq!(status, RunStatus::Failed);
        assert_lines(
            &logs.lines(),
            &[
                "Using the postgres backend",
                "Unexpected error while resetting exercises: DATABASE_URL is required by the postgres backend",
            ],
        );
    }

    #[tokio::test]
    async fn unusable_api_key_is_logged_not_raised() {
        let (logs, _guard) = Logs::capture();
        let file = config_file(
            r#"
            backend = "rest"
            supabase_url = "https://project.supabase.co"
            supabase_service_role_key = "bad\nkey"
            "#,
        );

        let status = reset(&args(file.path().to_path_buf())).await;

        assert_eq!(status, RunStatus::Failed);

        let lines = logs.lines();
        assert_lines(
            &lines,
            &[
                "Using the rest backend",
                "Unexpected error while resetting exercises:",
            ],
        );
        assert!(lines[1].contains("ERROR"), "{}", lines[1]);
    }

    #[tokio::test]
    async fn configured_table_is_named_in_failures() {
        let (logs, _guard) = Logs::capture();
        let file = config_file(r#"table = "exercises_staging""#);

        let status = reset(&args(file.path().to_path_buf())).await;

        assert_eq!(status, RunStatus::Failed);
        assert_lines(
            &logs.lines(),
            &[
                "Using the postgres backend",
                "Unexpected error while resetting exercises_staging:",
            ],
        );
    }

    #[tokio::test]
    async fn unreadable_config_is_logged_not_raised() {
        let (logs, _guard) = Logs::capture();
        let file = config_file(r#"backend = "mongo""#);

        let status = reset(&args(file.path().to_path_buf())).await;

        assert_eq!(status, RunStatus::Failed);
        assert_lines(
            &logs.lines(),
            &["Unexpected error while loading the reset configuration:"],
        );
    }

    #[tokio::test]
    async fn missing_config_file_is_logged_not_raised() {
        let (logs, _guard) = Logs::capture();
        let dir = tempfile::tempdir().unwrap();

        let status = reset(&args(dir.path().join("absent.toml"))).await;

        assert_eq!(status, RunStatus::Failed);
        assert_lines(
            &logs.lines(),
            &["Unexpected error while loading the reset configuration:"],
        );
    }
}
