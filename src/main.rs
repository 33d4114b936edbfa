// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load .env and set up logging
// 2. Parse command-line arguments using clap
// 3. Dispatch to the check or serve subcommand
// 4. Exit with proper code (0 = reachable, 1 = check failed, 2 = error)
//
// Logs go to stderr; stdout is reserved for results so `--json` output can
// be piped straight into other tools.
// =============================================================================

mod checker; // src/checker/ - normalization, timeout, timed fetch
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - server settings and .env loading
mod server; // src/server/ - HTTP API around the checker

use anyhow::Result;
use checker::{CheckFailure, CheckRequest, CheckResponse, CheckResult, Checker, FailureKind};
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Exit code when the URL was reached (any HTTP status)
const EXIT_OK: i32 = 0;
/// Exit code when the check timed out or hit a network failure
const EXIT_CHECK_FAILED: i32 = 1;
/// Exit code for invalid input or an internal error
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    // .env first, so RUST_LOG and friends from the file take effect
    config::load_dotenv()?;
    init_tracing()?;

    let cli = Cli::parse();
    let checker = Checker::new(cli.default_timeout_ms)?;

    match cli.command {
        Commands::Check { url, timeout_ms, json } => {
            let request = CheckRequest::new(url, timeout_ms.map(|ms| ms as f64));
            let outcome = checker.check(&request).await;
            let code = exit_code_for(&outcome);
            print_outcome(outcome, json)?;
            Ok(code)
        }
        Commands::Serve(args) => {
            server::serve(args.into(), checker).await?;
            Ok(EXIT_OK)
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("url_health_checker=info,tower_http=info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn exit_code_for(outcome: &Result<CheckResult, CheckFailure>) -> i32 {
    match outcome {
        Ok(_) => EXIT_OK,
        Err(failure) => match failure.kind() {
            FailureKind::Validation => EXIT_ERROR,
            FailureKind::Timeout | FailureKind::Network => EXIT_CHECK_FAILED,
        },
    }
}

// Prints a check outcome either as JSON or as a short summary
fn print_outcome(outcome: Result<CheckResult, CheckFailure>, json: bool) -> Result<()> {
    if json {
        let body = CheckResponse::from(outcome);
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match outcome {
        Ok(result) => {
            println!("✅ {}", result.requested_url);
            println!("   Status:        {}", result.status_code);
            println!("   Response time: {} ms", result.elapsed_ms);
            println!("   Final URL:     {}", result.final_url);
            println!("   Checked at:    {}", checker::format_timestamp(&result.checked_at));
        }
        Err(failure) => {
            let icon = match failure.kind() {
                FailureKind::Validation => "⚠️ ",
                FailureKind::Timeout => "⏱️ ",
                FailureKind::Network => "❌",
            };
            println!("{} {}", icon, failure.message());
        }
    }
    Ok(())
}
