//! Command-line and environment configuration.
//!
//! Every flag has an environment-variable fallback so the service can be
//! configured entirely from its deployment environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use github::{GitHubConfig, DEFAULT_API_URL};
use listener::WebhookSecret;
use thiserror::Error;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "repo-provisioner")]
#[command(author, version, about = "Applies ownership policy to newly created GitHub repositories")]
pub struct Cli {
    #[command(flatten)]
    pub github: GitHubArgs,

    #[command(flatten)]
    pub telemetry: TelemetryArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GitHubArgs {
    /// Token used for GitHub API calls (installation or personal access token)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// GitHub REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Per-request timeout for GitHub API calls, in seconds
    #[arg(long, env = "GITHUB_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct TelemetryArgs {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for trace export; export is disabled when unset
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Receive GitHub webhook deliveries over HTTP
    Serve(ServeArgs),

    /// Process a single repository.created payload read from a file
    Handle(HandleArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind the webhook receiver to
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Webhook secret configured on the GitHub App
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: String,
}

#[derive(Debug, Args)]
pub struct HandleArgs {
    /// Path to a `repository` webhook payload (JSON)
    #[arg(long)]
    pub payload: PathBuf,
}

/// Configuration that parsed but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GitHub token must not be empty")]
    EmptyToken,

    #[error("webhook secret must not be empty")]
    EmptyWebhookSecret,

    #[error("request timeout must be at least one second")]
    ZeroTimeout,

    #[error("GitHub API URL '{url}' is not a valid http(s) URL: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

impl GitHubArgs {
    pub fn to_config(&self) -> Result<GitHubConfig, ConfigError> {
        if self.github_token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let invalid_url = |reason: String| ConfigError::InvalidApiUrl {
            url: self.github_api_url.clone(),
            reason,
        };
        let parsed = Url::parse(&self.github_api_url).map_err(|e| invalid_url(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid_url(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        Ok(GitHubConfig {
            api_url: self.github_api_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..GitHubConfig::new(self.github_token.clone())
        })
    }
}

impl ServeArgs {
    pub fn secret(&self) -> Result<WebhookSecret, ConfigError> {
        WebhookSecret::new(&self.webhook_secret).ok_or(ConfigError::EmptyWebhookSecret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn serve_parses_with_defaults() {
        let cli = parse(&[
            "repo-provisioner",
            "--github-token",
            "ghs_test",
            "serve",
            "--webhook-secret",
            "s3cr3t",
        ]);
        assert_eq!(cli.github.github_api_url, DEFAULT_API_URL);
        assert_eq!(cli.telemetry.log_format, LogFormat::Pretty);
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.listen, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert!(serve.secret().is_ok());

        let config = cli.github.to_config().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.token, "ghs_test");
    }

    #[test]
    fn handle_takes_a_payload_path() {
        let cli = parse(&[
            "repo-provisioner",
            "--github-token",
            "ghs_test",
            "--log-format",
            "json",
            "handle",
            "--payload",
            "fixtures/repository.created.json",
        ]);
        assert_eq!(cli.telemetry.log_format, LogFormat::Json);
        let Command::Handle(handle) = cli.command else {
            panic!("expected handle");
        };
        assert_eq!(handle.payload, PathBuf::from("fixtures/repository.created.json"));
    }

    #[test]
    fn empty_values_are_rejected() {
        let args = GitHubArgs {
            github_token: " ".into(),
            github_api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: 30,
        };
        assert_eq!(args.to_config().unwrap_err(), ConfigError::EmptyToken);

        let args = GitHubArgs {
            github_token: "ghs_test".into(),
            github_api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: 0,
        };
        assert_eq!(args.to_config().unwrap_err(), ConfigError::ZeroTimeout);

        for url in ["not a url", "api.github.com", "ftp://ghe.example.com/api/v3"] {
            let args = GitHubArgs {
                github_token: "ghs_test".into(),
                github_api_url: url.into(),
                request_timeout_secs: 30,
            };
            assert!(
                matches!(args.to_config(), Err(ConfigError::InvalidApiUrl { .. })),
                "url: {url}"
            );
        }

        let args = GitHubArgs {
            github_token: "ghs_test".into(),
            github_api_url: "https://ghe.example.com/api/v3".into(),
            request_timeout_secs: 30,
        };
        assert_eq!(args.to_config().unwrap().api_url, "https://ghe.example.com/api/v3");

        let serve = ServeArgs {
            listen: "127.0.0.1:3000".parse().unwrap(),
            webhook_secret: String::new(),
        };
        assert!(matches!(serve.secret(), Err(ConfigError::EmptyWebhookSecret)));
    }
}
