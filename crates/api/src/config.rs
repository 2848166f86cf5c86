//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PRONTO_HASHING_SECRET` - Password hashing key (min 32 chars, not a placeholder)
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_SOURCE_TOKEN` - Payment source reference charged for every order
//! - `MAILGUN_API_KEY` - Mailgun API key
//! - `MAILGUN_DOMAIN` - Mailgun sending domain
//! - `MAILGUN_FROM` - From address for receipt emails
//!
//! ## Optional
//! - `PRONTO_DATA_DIR` - Entity store directory (default: .data)
//! - `PRONTO_HOST` - Bind address (default: 127.0.0.1)
//! - `PRONTO_PORT` - Listen port (default: 3000)
//! - `STRIPE_CURRENCY` - ISO 4217 charge currency (default: nzd)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the file-backed entity store
    pub data_dir: PathBuf,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Password hashing key
    pub hashing_secret: SecretString,
    /// Stripe payment configuration
    pub stripe: StripeConfig,
    /// Mailgun notification configuration
    pub mailgun: MailgunConfig,
}

/// Stripe payment gateway configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// API secret key (server-side only)
    pub secret_key: SecretString,
    /// Payment source reference charged for every order
    pub source_token: String,
    /// ISO 4217 currency code, lowercase
    pub currency: String,
}

/// Mailgun notification gateway configuration.
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    /// API key (server-side only)
    pub api_key: SecretString,
    /// Sending domain
    pub domain: String,
    /// From address for receipt emails
    pub from: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (length, placeholder detection).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("PRONTO_DATA_DIR", ".data"));
        let host = get_env_or_default("PRONTO_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PRONTO_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("PRONTO_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PRONTO_PORT".to_owned(), e.to_string()))?;
        let hashing_secret = get_validated_secret("PRONTO_HASHING_SECRET")?;

        Ok(Self {
            data_dir,
            host,
            port,
            hashing_secret,
            stripe: StripeConfig::from_env()?,
            mailgun: MailgunConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_required_secret("STRIPE_SECRET_KEY")?,
            source_token: get_required_env("STRIPE_SOURCE_TOKEN")?,
            currency: get_env_or_default("STRIPE_CURRENCY", "nzd").to_lowercase(),
        })
    }
}

impl MailgunConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_secret("MAILGUN_API_KEY")?,
            domain: get_required_env("MAILGUN_DOMAIN")?,
            from: get_required_env("MAILGUN_FROM")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Validate that a secret is long enough and not a placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {MIN_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
