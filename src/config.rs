use crate::exchanging::DEFAULT_RATES_URL;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    off,
    error,
    warn,
    info,
    debug,
    trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::off => LevelFilter::Off,
            LogLevel::error => LevelFilter::Error,
            LogLevel::warn => LevelFilter::Warn,
            LogLevel::info => LevelFilter::Info,
            LogLevel::debug => LevelFilter::Debug,
            LogLevel::trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Scientific calculator shell: arithmetic, variables, functions of x,
/// unit and currency conversion
pub struct Options {
    /// Base URL of the exchange rate service, queried as <URL>/<FROM>
    #[arg(long, env = "SHELL_CALC_RATES_URL", default_value = DEFAULT_RATES_URL)]
    pub rates_url: String,

    /// Seconds to wait for the exchange rate service
    #[arg(long, env = "SHELL_CALC_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,

    #[arg(long, value_enum, default_value_t = LogLevel::warn)]
    pub log_level: LogLevel,

    /// Print results without colors
    #[arg(long)]
    pub no_color: bool,

    /// Evaluate this line and exit instead of starting the shell
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub expression: Vec<String>,
}

impl Options {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// The one-shot line, if any words were given.
    pub fn line(&self) -> Option<String> {
        let line = self.expression.join(" ");
        let line = line.trim();
        (!line.is_empty()).then(|| line.to_string())
    }
}

/// Sets up `env_logger` once; `RUST_LOG` still applies on top of `level`.
pub fn init_logger(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .format_timestamp_secs()
        .try_init()
        .ok();
}
