//! CLI argument definitions for the ankr binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ankr - agent action-call pipeline service.
#[derive(Parser, Debug)]
#[command(name = "ankr", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port", global = true)]
    pub port: Option<u16>,

    /// Data directory holding the SQLite database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API server (default).
    Serve,
    /// Drain the oldest requested action calls once and print the report.
    Pump {
        /// Number of calls to process (clamped to the configured maximum).
        #[arg(long)]
        limit: Option<i64>,
        /// Principal recorded as the executor.
        #[arg(long)]
        executor: Option<String>,
    },
}

impl CliArgs {
    /// The subcommand to run; `serve` when none is given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ANKR_CONFIG env var > ~/.ankr/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ANKR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > ANKR_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("ANKR_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the data directory: --data-dir flag > config file value.
    pub fn resolve_data_dir(&self, config_dir: &str) -> PathBuf {
        match self.data_dir {
            Some(ref p) => p.clone(),
            None => expand_home(config_dir),
        }
    }

    /// Resolve the log level: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";
    std::env::var(var).ok().map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".ankr").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let args = CliArgs::try_parse_from(["ankr"]).unwrap();
        assert_eq!(args.command(), Command::Serve);
    }

    #[test]
    fn test_pump_subcommand_with_global_flags() {
        let args = CliArgs::try_parse_from([
            "ankr", "pump", "--limit", "3", "--executor", "cron", "--port", "9000",
        ])
        .unwrap();
        assert_eq!(
            args.command(),
            Command::Pump {
                limit: Some(3),
                executor: Some("cron".to_string()),
            }
        );
        assert_eq!(args.resolve_port(3040), 9000);
    }

    #[test]
    fn test_flags_override_config_values() {
        let args = CliArgs::try_parse_from([
            "ankr", "--data-dir", "/tmp/ankr", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(args.resolve_data_dir("~/.ankr/data"), PathBuf::from("/tmp/ankr"));
        assert_eq!(args.resolve_log_level("info"), "debug");
    }

    #[test]
    fn test_config_values_used_without_flags() {
        let args = CliArgs::try_parse_from(["ankr"]).unwrap();
        assert_eq!(args.resolve_data_dir("/srv/ankr"), PathBuf::from("/srv/ankr"));
        assert_eq!(args.resolve_log_level("warn"), "warn");
    }

    #[test]
    fn test_non_integer_pump_limit_is_rejected() {
        assert!(CliArgs::try_parse_from(["ankr", "pump", "--limit", "two"]).is_err());
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("data"), PathBuf::from("data"));
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    }
}
