#![deny(unused_crate_dependencies)]

//! Logging setup and macros shared by the workspace binaries.
//!
//! `info!`, `debug!` and `trace!` are plain re-exports of the `tracing` ones.
//! `warn!` and `error!` additionally record the file, line and column of the
//! call site as tracing fields.
//!
//! The format of the logs in `stdout` can be `plain` or `json` and is set by the `MISC_LOG_FORMAT` env variable.
//!
//! Errors may also be reported to Sentry when `MISC_SENTRY_URL` is set
//! <https://docs.sentry.io/platforms/rust/>

use std::{backtrace::Backtrace, borrow::Cow, str::FromStr};

use sentry::{types::Dsn, ClientInitGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use chrono as __chrono;
pub use sentry as __sentry;
pub use tracing as __tracing;
pub use tracing::{debug, info, log, trace};

const LOG_FORMAT: &str = "MISC_LOG_FORMAT";
const SENTRY_URL: &str = "MISC_SENTRY_URL";
const SENTRY_ENVIRONMENT: &str = "MISC_SENTRY_ENVIRONMENT";

/// Logs a warning together with the location of the call site.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!(
            file = file!(),
            line = line!(),
            column = column!(),
            $($arg)*
        )
    };
}

/// Logs an error together with the location of the call site.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!(
            file = file!(),
            line = line!(),
            column = column!(),
            $($arg)*
        )
    };
}

/// Output format of the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines.
    Plain,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("unexpected log format {other:?}")),
        }
    }
}

fn get_sentry_url() -> Option<Dsn> {
    std::env::var(SENTRY_URL)
        .ok()
        .and_then(|url| Dsn::from_str(&url).ok())
}

/// Initialize logging with tracing and set up log format
///
/// If the sentry URL is provided via an environment variable, this function will also initialize sentry.
/// Returns a sentry client guard. The full description can be found in the official documentation:
/// <https://docs.sentry.io/platforms/rust/#configure>
#[must_use]
pub fn init() -> Option<ClientInitGuard> {
    let log_format = std::env::var(LOG_FORMAT).unwrap_or_else(|_| "plain".to_string());

    let (format, unknown) = match log_format.parse() {
        Ok(format) => (format, None),
        Err(e) => (LogFormat::Plain, Some(e)),
    };

    match format {
        LogFormat::Plain => {
            tracing_subscriber::registry()
                .with(fmt::Layer::default())
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
        LogFormat::Json => {
            let timer = tracing_subscriber::fmt::time::UtcTime::rfc_3339();
            // must be set before sentry hook for sentry to function
            install_pretty_panic_hook();

            tracing_subscriber::registry()
                .with(
                    fmt::Layer::default()
                        .with_file(true)
                        .with_line_number(true)
                        .with_timer(timer)
                        .json(),
                )
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
    }

    if let Some(e) = unknown {
        warn!("{LOG_FORMAT}: {e}, falling back to plain logs");
    }

    get_sentry_url().map(|sentry_url| {
        let environment = std::env::var(SENTRY_ENVIRONMENT).ok().map(Cow::from);

        let options = sentry::ClientOptions {
            release: sentry::release_name!(),
            environment,
            attach_stacktrace: true,
            ..Default::default()
        };

        sentry::init((sentry_url, options))
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "Panic occurred without additional info"
    }
}

/// Format panics like tracing::error
fn install_pretty_panic_hook() {
    // This hook does not use the previous one set because it leads to 2 logs:
    // the first is the default panic log and the second is from this code. To avoid this situation,
    // hook must be installed first
    std::panic::set_hook(Box::new(move |panic_info| {
        let backtrace = Backtrace::capture();
        let timestamp = chrono::Utc::now();

        let panic_location = panic_info
            .location()
            .map(|val| val.to_string())
            .unwrap_or_else(|| "Unknown location".to_owned());

        println!(
            "{}",
            serde_json::json!({
                "timestamp": timestamp.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string(),
                "level": "CRITICAL",
                "fields": {
                    "message": panic_message(panic_info.payload()),
                    "location": panic_location,
                    "backtrace": backtrace.to_string(),
                }
            })
        );
    }));
}
