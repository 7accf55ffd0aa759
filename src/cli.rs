use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::method::Args;

/// Output format for mapped responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Indented tag/field dump
    #[default]
    Human,
    /// JSON, one document per result
    Json,
}

/// Call a Flickr-style REST API method and print the mapped response
#[derive(Parser, Debug, Clone)]
#[command(name = "flickr-rpc")]
#[command(about = "Call a Flickr-style XML REST method and print the result")]
#[command(version)]
pub struct Cli {
    /// Method name, with or without the namespace (e.g. 'people.findByUsername')
    #[arg(help = "Method to call, e.g. 'people.getInfo'")]
    pub method: String,

    /// Call arguments as key=value pairs
    #[arg(value_name = "KEY=VALUE")]
    pub args: Vec<String>,

    /// Follow pagination and print every item of every page
    #[arg(short = 'p', long = "paginate")]
    pub paginate: bool,

    /// Stop after this many paginated items
    #[arg(long = "limit", requires = "paginate")]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API key (overrides configuration and FLICKR_API_KEY)
    #[arg(long = "api-key")]
    pub api_key: Option<String>,

    /// Shared secret used to sign requests
    #[arg(long = "secret")]
    pub secret: Option<String>,

    /// Auth token
    #[arg(long = "auth-token")]
    pub auth_token: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Method path relative to the namespace; a leading namespace is dropped
    pub fn method_path<'a>(&'a self, namespace: &str) -> &'a str {
        self.method
            .strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.method)
    }

    pub fn call_args(&self) -> Result<Args, String> {
        self.args
            .iter()
            .map(|pair| {
                pair.split_once('=')
                    .filter(|(key, _)| !key.is_empty())
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", pair))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|pairs| pairs.into_iter().collect())
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::ArgValue;

    #[test]
    fn test_basic_cli_parsing() {
        let cli = Cli::try_parse_from(["flickr-rpc", "people.findByUsername", "username=bees"])
            .unwrap();
        assert_eq!(cli.method, "people.findByUsername");
        assert!(!cli.paginate);

        let args = cli.call_args().unwrap();
        assert_eq!(
            args.get("username"),
            Some(&ArgValue::Single("bees".to_string()))
        );
    }

    #[test]
    fn test_namespace_prefix_is_optional() {
        let bare = Cli::try_parse_from(["flickr-rpc", "test.echo"]).unwrap();
        let full = Cli::try_parse_from(["flickr-rpc", "flickr.test.echo"]).unwrap();
        assert_eq!(bare.method_path("flickr"), "test.echo");
        assert_eq!(full.method_path("flickr"), "test.echo");

        let lookalike = Cli::try_parse_from(["flickr-rpc", "flickrx.echo"]).unwrap();
        assert_eq!(lookalike.method_path("flickr"), "flickrx.echo");
    }

    #[test]
    fn test_malformed_argument_rejected() {
        let cli = Cli::try_parse_from(["flickr-rpc", "test.echo", "novalue"]).unwrap();
        assert!(cli.call_args().is_err());

        let cli = Cli::try_parse_from(["flickr-rpc", "test.echo", "=x"]).unwrap();
        assert!(cli.call_args().is_err());
    }

    #[test]
    fn test_value_may_contain_equals() {
        let cli = Cli::try_parse_from(["flickr-rpc", "test.echo", "text=a=b"]).unwrap();
        let args = cli.call_args().unwrap();
        assert_eq!(args.get("text"), Some(&ArgValue::Single("a=b".to_string())));
    }

    #[test]
    fn test_limit_requires_paginate() {
        assert!(Cli::try_parse_from(["flickr-rpc", "photos.search", "--limit", "5"]).is_err());
        let cli =
            Cli::try_parse_from(["flickr-rpc", "photos.search", "-p", "--limit", "5"]).unwrap();
        assert_eq!(cli.limit, Some(5));
    }

    #[test]
    fn test_log_filter() {
        let quiet = Cli::try_parse_from(["flickr-rpc", "test.echo"]).unwrap();
        let verbose = Cli::try_parse_from(["flickr-rpc", "test.echo", "-v"]).unwrap();
        assert_eq!(quiet.log_filter(), "warn");
        assert_eq!(verbose.log_filter(), "debug");
    }
}
