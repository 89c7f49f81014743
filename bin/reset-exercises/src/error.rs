#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    Env(#[from] envconfig::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),

    #[error("unknown store backend {0:?}, expected `postgres` or `rest`")]
    UnknownBackend(String),

    #[error("DATABASE_URL is required by the postgres backend")]
    NoDatabaseUrl,

    #[error("SUPABASE_URL is required by the rest backend")]
    NoSupabaseUrl,

    #[error("SUPABASE_SERVICE_ROLE_KEY is required by the rest backend")]
    NoSupabaseKey,
}
