#![forbid(unsafe_code)]
//! push-guard: git pre-push hook.
//!
//! Exit behavior:
//!   - Exit 0 = push allowed
//!   - Exit 1 = push blocked (reason on stderr)
//!   - Exit 2 = usage error (bad arguments or malformed stdin)
//!
//! Install by linking or copying the binary to `.git/hooks/pre-push`.

use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;
use push_guard::cli::{self, Cli};
use push_guard::config::Config;
use push_guard::{hook, logging};
use std::io;

// Build metadata from vergen (set by build.rs)
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_TIMESTAMP: Option<&str> = option_env!("VERGEN_BUILD_TIMESTAMP");
const RUSTC_SEMVER: Option<&str> = option_env!("VERGEN_RUSTC_SEMVER");
const CARGO_TARGET: Option<&str> = option_env!("VERGEN_CARGO_TARGET_TRIPLE");

const EXIT_USAGE: i32 = 2;

fn print_version() {
    eprintln!("{} {}", "push-guard".bold(), format!("v{PKG_VERSION}").cyan());
    if let Some(ts) = BUILD_TIMESTAMP {
        let date = ts.split('T').next().unwrap_or(ts);
        eprintln!("  {} {date}", "Built:".bright_black());
    }
    if let Some(rustc) = RUSTC_SEMVER {
        eprintln!("  {} {rustc}", "Rustc:".bright_black());
    }
    if let Some(target) = CARGO_TARGET {
        eprintln!("  {} {target}", "Target:".bright_black());
    }
}

fn main() {
    hook::configure_colors("auto");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            print_version();
            return;
        }
        Err(e) if e.kind() == ErrorKind::DisplayHelp => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(EXIT_USAGE);
        }
    };

    // Before config load, so config warnings are visible.
    logging::init_tracing(cli.verbose);
    let config = Config::load(cli.config.as_deref());
    hook::configure_colors(config.general.color());

    match cli::run_with_config(&cli, &config, io::stdin().lock()) {
        Ok(decision) => {
            if let Some(reason) = decision.reason() {
                hook::output_block(reason);
            }
            std::process::exit(decision.exit_code());
        }
        Err(e) => {
            eprintln!("{} {e}", "push-guard:".red().bold());
            std::process::exit(EXIT_USAGE);
        }
    }
}
