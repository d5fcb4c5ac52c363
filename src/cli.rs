//! Command-line interface.
//!
//! Git invokes the hook as `pre-push <remote name> <remote location>`, so the
//! two positionals are required; flags are for humans testing the hook.

use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;
use crate::guard::{Decision, PushGuard};
use crate::hook::{self, HookInputError};
use crate::logging::DecisionLogger;

/// Git pre-push hook that only lets the protected branch through to the
/// protected repository.
#[derive(Debug, Parser)]
#[command(name = "push-guard", version, about)]
pub struct Cli {
    /// Name of the remote being pushed to (e.g. origin).
    pub remote_name: String,

    /// URL or path of the remote being pushed to.
    pub remote_location: String,

    /// Read configuration from this file instead of the default locations.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the hook with loaded configuration.
///
/// Reads the push info from `input`, evaluates it and records the decision.
/// Never exits the process; the caller maps the result to an exit code.
///
/// # Errors
///
/// Returns [`HookInputError`] when `input` cannot be read or does not hold
/// exactly four tokens.
pub fn run_with_config<R: Read>(
    cli: &Cli,
    config: &Config,
    input: R,
) -> Result<Decision, HookInputError> {
    let request = hook::read_push_request(
        input,
        &cli.remote_name,
        &cli.remote_location,
        config.general.max_input_bytes(),
    )?;
    debug!(
        remote = %request.remote_name,
        location = %request.remote_location,
        remote_ref = %request.remote_ref,
        "evaluating push"
    );

    let guard = PushGuard::from_config(&config.protected);
    let decision = guard.evaluate(&request);
    debug!(decision = decision.label(), "push evaluated");

    if let Some(logger) = DecisionLogger::new(&config.logging) {
        logger.log(&request, &decision);
    }

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const YB: &str = "git@github.com:yugabyte/yugabyte-db.git";

    fn cli(name: &str, location: &str) -> Cli {
        Cli::try_parse_from(["push-guard", name, location]).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn requires_both_positionals() {
        assert!(Cli::try_parse_from(["push-guard"]).is_err());
        assert!(Cli::try_parse_from(["push-guard", "origin"]).is_err());
        assert!(Cli::try_parse_from(["push-guard", "origin", YB, "extra"]).is_err());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["push-guard", "--verbose", "--config", "/tmp/c.toml", "o", "l"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(cli.remote_name, "o");
        assert_eq!(cli.remote_location, "l");
    }

    #[test]
    fn scenario_master_on_protected_remote() {
        let decision = run_with_config(
            &cli("origin", YB),
            &Config::default(),
            "refA sha1A refs/heads/master sha1B".as_bytes(),
        )
        .unwrap();
        assert_eq!(decision.exit_code(), 0);
    }

    #[test]
    fn scenario_feature_on_protected_remote() {
        let decision = run_with_config(
            &cli("origin", YB),
            &Config::default(),
            "refA sha1A refs/heads/feature sha1B".as_bytes(),
        )
        .unwrap();
        assert_eq!(decision.exit_code(), 1);
        assert!(decision.reason().unwrap().contains("Cannot push"));
    }

    #[test]
    fn scenario_feature_on_other_remote() {
        let decision = run_with_config(
            &cli("upstream", "git@github.com:other/repo.git"),
            &Config::default(),
            "refA sha1A refs/heads/feature sha1B".as_bytes(),
        )
        .unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn malformed_stdin_is_an_error() {
        let err = run_with_config(
            &cli("origin", YB),
            &Config::default(),
            "refA sha1A refs/heads/feature".as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, HookInputError::TokenCount { found: 3 }));
    }

    #[test]
    fn configured_branch_is_honored() {
        let mut config = Config::default();
        config.protected.branch = Some("refs/heads/main".to_string());

        let main = run_with_config(
            &cli("origin", YB),
            &config,
            "refA sha1A refs/heads/main sha1B".as_bytes(),
        )
        .unwrap();
        assert_eq!(main, Decision::Allow);

        let master = run_with_config(
            &cli("origin", YB),
            &config,
            "refA sha1A refs/heads/master sha1B".as_bytes(),
        )
        .unwrap();
        assert!(master.is_blocked());
    }
}
