//! Logging setup.
//!
//! The library only emits `tracing` events. Hosts that have no subscriber of
//! their own can install one with [`init_logging`] or, from C,
//! `islcore_init_logging`.

use crate::error::IslFfiError;
use crate::util::{cstr_to_option_str, set_error, set_ok};
use serde::Deserialize;
use std::os::raw::c_char;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "ISLCORE_LOG";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive: trace, debug, info, warn, error, off, or a full
    /// `tracing` filter such as `islcore=debug`
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Enable colored output (text format only)
    #[serde(default)]
    pub ansi: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            ansi: false,
        }
    }
}

impl LoggingConfig {
    /// Filter from `ISLCORE_LOG` if set and valid, else from `level`.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new(default_level()))
    }
}

/// Install a global stderr subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which case
/// nothing changes.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.is_ok()
}

/// Install a global stderr subscriber from a JSON configuration.
///
/// # Parameters
///
/// - `config_json`: `{"level": "debug", "format": "json", "ansi": false}`;
///   every field is optional, NULL means defaults
/// - `error`: Out-parameter for error information
///
/// # Returns
///
/// 1 if the subscriber was installed, 0 if one already existed or on error.
///
/// # Safety
///
/// - `config_json` must be a valid null-terminated string or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_init_logging(
    config_json: *const c_char,
    error: *mut IslFfiError,
) -> i32 {
    let config = match unsafe { cstr_to_option_str(config_json, "config_json") } {
        Ok(Some(json)) => match serde_json::from_str::<LoggingConfig>(json) {
            Ok(c) => c,
            Err(e) => return unsafe { set_error(error, IslFfiError::json_parse(e)) },
        },
        Ok(None) => LoggingConfig::default(),
        Err(e) => return unsafe { set_error(error, e) },
    };

    unsafe { set_ok(error) };
    i32::from(init_logging(&config))
}
