// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - check: Check one URL and print the result
// - serve: Run the HTTP API (and optionally a static frontend)
//
// Every option can also come from an environment variable (clap's `env`
// feature), so the same settings work on the command line, in a .env file,
// or in a container.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::checker::DEFAULT_TIMEOUT_MS;
use crate::config::{ServerConfig, DEFAULT_CORS_ORIGIN, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STATIC_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "url-health-checker",
    version,
    about = "Check whether a URL is reachable",
    long_about = "url-health-checker reports the HTTP status, final URL after redirects, \
                  and response time of a URL, either from the command line or over a small JSON API."
)]
pub struct Cli {
    /// Timeout in milliseconds used when a check does not specify one (500-20000)
    #[arg(long, global = true, env = "DEFAULT_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub default_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a single URL
    ///
    /// Example: url-health-checker check example.com --timeout-ms 2000
    Check {
        /// URL to check; https:// is assumed when no scheme is given
        url: String,

        /// Timeout for this check in milliseconds (500-20000)
        #[arg(long, allow_negative_numbers = true)]
        timeout_ms: Option<i64>,

        /// Print the JSON response body instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP API server
    ///
    /// Example: url-health-checker serve --port 8080
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    pub cors_origin: String,

    /// Directory holding a built frontend (served if it exists)
    #[arg(long, env = "STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        ServerConfig {
            host: args.host,
            port: args.port,
            cors_origin: args.cors_origin,
            static_dir: args.static_dir,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `env = "PORT"` do?
//    - If --port is not on the command line, clap reads the PORT variable
//    - If neither is present, default_value_t is used
//
// 2. What does `global = true` do?
//    - The flag may appear before or after the subcommand name
//    - `--default-timeout-ms 2000 check x` and `check x --default-timeout-ms 2000`
//      both work
//
// 3. Why Option<i64> for --timeout-ms?
//    - None means "use the default"
//    - Negative numbers must still parse so the checker can reject them with
//      the same message the API returns
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "url-health-checker",
            "check",
            "example.com",
            "--timeout-ms",
            "1500",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Check { url, timeout_ms, json } => {
                assert_eq!(url, "example.com");
                assert_eq!(timeout_ms, Some(1500));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_negative_timeout_reaches_validation() {
        let cli = Cli::try_parse_from([
            "url-health-checker",
            "check",
            "example.com",
            "--timeout-ms",
            "-5",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Check { timeout_ms: Some(-5), .. }));
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "url-health-checker",
            "serve",
            "--port",
            "9000",
            "--cors-origin",
            "https://app.example.com",
            "--default-timeout-ms",
            "2500",
        ])
        .unwrap();

        assert_eq!(cli.default_timeout_ms, 2500);
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = ServerConfig::from(args);
        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origin, "https://app.example.com");
    }
}
