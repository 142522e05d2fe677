//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup into an immutable [`Config`] that the
//! web server shares with handlers and the mail sender.

use std::env;
use tracing::warn;

/// Default listen port, matching the port Freqtrade setups usually point at.
const DEFAULT_PORT: u16 = 5001;

/// AWS credentials used to sign SES requests.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address alerts are sent from (must be verified in SES)
    pub email_sender: String,

    /// Address alerts are delivered to
    pub email_recipient: String,

    /// AWS region hosting the SES endpoint
    pub aws_region: String,

    /// Shared secret for webhook authentication. `None` or blank means open mode.
    pub api_key: Option<String>,

    /// Port for the web server to listen on
    pub port: u16,

    /// Explicit keys for signing SES requests. When unset the mailer falls
    /// back to the standard AWS provider chain.
    pub aws_credentials: Option<AwsCredentials>,

    /// Override for the SES base URL (local stubs, VPC endpoints)
    pub ses_endpoint: Option<String>,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            email_sender: env::var("EMAIL_SENDER")
                .unwrap_or_else(|_| "your-sender@example.com".to_string()),

            email_recipient: env::var("EMAIL_RECIPIENT")
                .unwrap_or_else(|_| "your-recipient@example.com".to_string()),

            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),

            api_key: env::var("API_KEY").ok(),

            port: parse_or("PORT", DEFAULT_PORT),

            aws_credentials: credentials_from_env(),

            ses_endpoint: env::var("SES_ENDPOINT").ok().filter(|v| !v.trim().is_empty()),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", 10_000),
        }
    }

    /// The secret requests must present, if authentication is enabled.
    ///
    /// A blank `API_KEY` counts as unset.
    pub fn secret(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    /// Base URL of the SES API for the configured region.
    pub fn ses_base_url(&self) -> String {
        match &self.ses_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://email.{}.amazonaws.com", self.aws_region),
        }
    }
}

/// Parse a variable into `T`, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, default = %default, "Invalid value, using default");
            default
        }
    }
}

/// Read explicitly configured AWS keys from the environment.
fn credentials_from_env() -> Option<AwsCredentials> {
    let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty())?;
    let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY")
        .ok()
        .filter(|v| !v.is_empty())?;

    Some(AwsCredentials {
        access_key_id,
        secret_access_key,
        session_token: env::var("AWS_SESSION_TOKEN").ok().filter(|v| !v.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(api_key: Option<&str>) -> Config {
        Config {
            email_sender: "sender@example.com".to_string(),
            email_recipient: "recipient@example.com".to_string(),
            aws_region: "eu-west-1".to_string(),
            api_key: api_key.map(str::to_string),
            port: DEFAULT_PORT,
            aws_credentials: None,
            ses_endpoint: None,
            request_timeout_ms: 1000,
        }
    }

    #[test]
    fn test_parse_or_valid() {
        env::set_var("TEST_NOTIFIER_PORT", "8088");
        assert_eq!(parse_or("TEST_NOTIFIER_PORT", 1u16), 8088);
        env::remove_var("TEST_NOTIFIER_PORT");
    }

    #[test]
    fn test_parse_or_invalid_uses_default() {
        env::set_var("TEST_NOTIFIER_TIMEOUT", "soon");
        assert_eq!(parse_or("TEST_NOTIFIER_TIMEOUT", 42u64), 42);
        env::remove_var("TEST_NOTIFIER_TIMEOUT");
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or("NONEXISTENT_NOTIFIER_VAR", 7u16), 7);
    }

    #[test]
    fn test_secret_blank_is_open_mode() {
        assert_eq!(config_with_key(None).secret(), None);
        assert_eq!(config_with_key(Some("")).secret(), None);
        assert_eq!(config_with_key(Some("   ")).secret(), None);
        assert_eq!(config_with_key(Some("s3cret")).secret(), Some("s3cret"));
    }

    #[test]
    fn test_ses_base_url() {
        let mut config = config_with_key(None);
        assert_eq!(config.ses_base_url(), "https://email.eu-west-1.amazonaws.com");

        config.ses_endpoint = Some("http://127.0.0.1:4566/".to_string());
        assert_eq!(config.ses_base_url(), "http://127.0.0.1:4566");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = AwsCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "super-secret".to_string(),
            session_token: Some("token".to_string()),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("\"token\""));
    }
}
