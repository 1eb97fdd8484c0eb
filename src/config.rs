//! Runner configuration
//!
//! Every setting comes from a command-line flag that falls back to an
//! environment variable, and ends up in one `RunnerConfig` value handed to
//! the runner.

use bon::Builder;
use clap::{Parser, Subcommand, ValueEnum};
use regex::Regex;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

use crate::http::HttpError;

#[derive(Parser, Debug)]
#[command(name = "linkbio-conformance", about = "HTTP conformance checks for a link-in-bio API")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Option<Mode>,

    /// Root URL of the application under test
    #[arg(long, env = "LINKBIO_BASE_URL", default_value = "http://localhost:3000", global = true)]
    pub base_url: String,

    /// Path prefix of the REST API
    #[arg(long, env = "LINKBIO_API_PREFIX", default_value = "/api", global = true)]
    pub api_prefix: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "LINKBIO_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Origin sent with the CORS preflight
    #[arg(long, env = "LINKBIO_ORIGIN", default_value = "http://localhost:3000", global = true)]
    pub origin: String,

    /// Domain used for generated test user emails
    #[arg(long, env = "LINKBIO_EMAIL_DOMAIN", default_value = "gmail.com", global = true)]
    pub email_domain: String,

    /// Username the profile update tries to claim
    #[arg(long, env = "LINKBIO_PROBE_USERNAME", default_value = "admin", global = true)]
    pub probe_username: String,

    /// How the target treats a sign-in right after sign-up
    #[arg(long, value_enum, env = "LINKBIO_SIGNIN_POLICY", default_value_t = SigninPolicyKind::ConfirmationRequired, global = true)]
    pub signin_policy: SigninPolicyKind,

    /// Pattern the unconfirmed-email sign-in error must match
    #[arg(long, env = "LINKBIO_UNCONFIRMED_EMAIL_ERROR", default_value = "Email not confirmed", global = true)]
    pub unconfirmed_email_error: String,

    /// Pattern the duplicate-username error must match
    #[arg(long, env = "LINKBIO_DUPLICATE_USERNAME_ERROR", default_value = "already taken", global = true)]
    pub duplicate_username_error: String,

    /// Print the summary as JSON instead of the text report
    #[arg(long, global = true)]
    pub json: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Every procedure, followed by cleanup
    #[default]
    Full,
    /// Quick post-deployment subset
    Smoke,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigninPolicyKind {
    ConfirmationRequired,
    Immediate,
}

/// Outcomes that depend on the target's account policy rather than on the
/// API contract itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigninPolicy {
    /// Sign-in of a fresh account is rejected with 400 and an error matching the pattern.
    ConfirmationRequired { error_pattern: String },
    /// Sign-in of a fresh account succeeds.
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectations {
    pub signin_policy: SigninPolicy,
    pub duplicate_username_error: String,
}

impl Default for Expectations {
    fn default() -> Self {
        Expectations {
            signin_policy: SigninPolicy::ConfirmationRequired {
                error_pattern: "Email not confirmed".to_string(),
            },
            duplicate_username_error: "already taken".to_string(),
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct RunnerConfig {
    #[builder(into)]
    pub base_url: String,
    #[builder(into, default = "/api".to_string())]
    pub api_prefix: String,
    #[builder(default = Duration::from_secs(10))]
    pub timeout: Duration,
    #[builder(into, default = "http://localhost:3000".to_string())]
    pub origin: String,
    #[builder(into, default = "gmail.com".to_string())]
    pub email_domain: String,
    #[builder(into, default = "admin".to_string())]
    pub probe_username: String,
    #[builder(default)]
    pub expectations: Expectations,
    /// Suppress the per-case progress output.
    #[builder(default = false)]
    pub quiet: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid expectation pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[from] HttpError),
}

impl RunnerConfig {
    /// Base URL and API prefix joined, without a trailing slash.
    pub fn api_base(&self) -> Result<String, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: err.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        let prefix = self.api_prefix.trim_matches('/');
        let base = self.base_url.trim_end_matches('/');
        if prefix.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{}/{}", base, prefix))
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_base()?;
        if let SigninPolicy::ConfirmationRequired { error_pattern } = &self.expectations.signin_policy {
            compile(error_pattern)?;
        }
        compile(&self.expectations.duplicate_username_error)?;
        Ok(())
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl From<&Cli> for RunnerConfig {
    fn from(cli: &Cli) -> Self {
        let signin_policy = match cli.signin_policy {
            SigninPolicyKind::ConfirmationRequired => SigninPolicy::ConfirmationRequired {
                error_pattern: cli.unconfirmed_email_error.clone(),
            },
            SigninPolicyKind::Immediate => SigninPolicy::Immediate,
        };
        RunnerConfig::builder()
            .base_url(cli.base_url.clone())
            .api_prefix(cli.api_prefix.clone())
            .timeout(Duration::from_secs(cli.timeout_secs))
            .origin(cli.origin.clone())
            .email_domain(cli.email_domain.clone())
            .probe_username(cli.probe_username.clone())
            .expectations(Expectations {
                signin_policy,
                duplicate_username_error: cli.duplicate_username_error.clone(),
            })
            .quiet(cli.json)
            .build()
    }
}
