use std::env::{self, VarError};

use anyhow::{Context, Result};
use clap::Parser;

/// Environment variable holding the registry API bearer token.
pub const TOKEN_VAR: &str = "QUAY_TOKEN";

/// Report or purge quay.io tags older than a given age
///
/// The API token is read from the QUAY_TOKEN environment variable.
#[derive(Debug, Parser, Clone)]
#[clap(name = "purge", allow_negative_numbers = true)]
pub struct Args {
    /// Repository to purge, as namespace/name
    pub repository: String,
    /// Minimum tag age in seconds to purge
    pub age: i64,
    /// Purge the matching tags
    #[clap(long)]
    pub purge: bool,
    /// Base URL of the registry API
    #[clap(long, default_value = "https://quay.io")]
    pub registry: String,
    #[clap(long)]
    pub debug: bool,
    #[clap(long)]
    pub trace: bool,
}

/// What to purge, and whether to actually do it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repository: String,
    pub age: i64,
    pub purge: bool,
}

impl Args {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            repository: self.repository.clone(),
            age: self.age,
            purge: self.purge,
        }
    }
}

/// Reads the API token from the environment.
pub fn read_token() -> Result<String> {
    token_from(env::var(TOKEN_VAR))
}

fn token_from(value: Result<String, VarError>) -> Result<String> {
    value.with_context(|| format!("{TOKEN_VAR} must be set to a registry API token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> clap::Result<Args> {
        Args::try_parse_from(std::iter::once("purge").chain(args.iter().copied()))
    }

    #[test]
    fn parses_positionals_and_defaults() {
        let args = parse(&["myorg/myrepo", "3600"]).unwrap();
        assert_eq!(args.registry, "https://quay.io");
        assert!(!args.debug);

        assert_eq!(
            args.config(),
            Config {
                repository: "myorg/myrepo".to_string(),
                age: 3600,
                purge: false,
            }
        );
    }

    #[test]
    fn parses_purge_flag() {
        let args = parse(&["myorg/myrepo", "0", "--purge"]).unwrap();
        assert!(args.config().purge);
    }

    #[test]
    fn accepts_negative_age() {
        let args = parse(&["myorg/myrepo", "-5"]).unwrap();
        assert_eq!(args.age, -5);
    }

    #[test]
    fn rejects_missing_age() {
        let err = parse(&["myorg/myrepo"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_non_integer_age() {
        let err = parse(&["myorg/myrepo", "old"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn token_is_not_a_command_line_flag() {
        let err = parse(&["myorg/myrepo", "0", "--token", "secret"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn reads_token_from_environment_value() {
        assert_eq!(token_from(Ok("secret".to_string())).unwrap(), "secret");
    }

    #[test]
    fn rejects_missing_token() {
        let err = token_from(Err(VarError::NotPresent)).unwrap_err();
        assert_eq!(err.to_string(), "QUAY_TOKEN must be set to a registry API token");
    }
}
