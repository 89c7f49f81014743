use std::{fmt, fs, path::Path, str::FromStr};

use envconfig::Envconfig;
use serde::Deserialize;
use url::Url;

use crate::error::Error;

/// Which kind of store holds the exercises.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Backend {
    /// Direct Postgres connection.
    #[default]
    Postgres,
    /// PostgREST API of a hosted project.
    Rest,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(Self::Postgres),
            "rest" => Ok(Self::Rest),
            other => Err(Error::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => f.write_str("postgres"),
            Self::Rest => f.write_str("rest"),
        }
    }
}

fn default_table() -> String {
    storage::EXERCISES_TABLE.to_string()
}

#[derive(Deserialize, Envconfig, Debug, PartialEq)]
pub(crate) struct Config {
    #[envconfig(from = "RESET_BACKEND", default = "postgres")]
    #[serde(default)]
    pub backend: Backend,

    #[envconfig(from = "DATABASE_URL")]
    pub database_url: Option<Url>,

    #[envconfig(from = "SUPABASE_URL")]
    pub supabase_url: Option<Url>,

    #[envconfig(from = "SUPABASE_SERVICE_ROLE_KEY")]
    pub supabase_service_role_key: Option<String>,

    #[envconfig(from = "RESET_TABLE", default = "exercises")]
    #[serde(default = "default_table")]
    pub table: String,
}

/// Everything needed to reach the store, validated against the chosen backend.
#[derive(Debug, PartialEq)]
pub(crate) enum StoreSettings {
    Postgres { database_url: Url },
    Rest { url: Url, api_key: String },
}

impl Config {
    pub(crate) fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(config_path)?;

        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    pub(crate) fn store_settings(&self) -> Result<StoreSettings, Error> {
        match self.backend {
            Backend::Postgres => Ok(StoreSettings::Postgres {
                database_url: self.database_url.clone().ok_or(Error::NoDatabaseUrl)?,
            }),
            Backend::Rest => Ok(StoreSettings::Rest {
                url: self.supabase_url.clone().ok_or(Error::NoSupabaseUrl)?,
                api_key: self
                    .supabase_service_role_key
                    .clone()
                    .filter(|key| !key.is_empty())
                    .ok_or(Error::NoSupabaseKey)?,
            }),
        }
    }
}
