use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api-gw.dhlparcel.nl";

/// DHL Parcel API client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// DHL Parcel API user id
    #[arg(short = 'u', long, env = "DHL_USER_ID")]
    pub user_id: Option<String>,

    /// DHL Parcel API key
    #[arg(short = 'k', long, env = "DHL_API_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Account number used for new shipments
    #[arg(short = 'a', long, env = "DHL_ACCOUNT_NUMBER")]
    pub account_number: Option<String>,

    /// API base URL
    #[arg(long, env = "DHL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Full authentication URL (defaults to {base-url}/authenticate/api-key)
    #[arg(long, env = "DHL_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Refresh URL (defaults to {base-url}/authenticate/refresh-token)
    #[arg(long, env = "DHL_REFRESH_URL")]
    pub refresh_url: Option<String>,

    /// Path to the SQLite token cache
    #[arg(short = 'c', long, env = "DHL_TOKEN_CACHE_FILE")]
    pub token_cache_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    /// HTTP max retries
    #[arg(long, env = "HTTP_MAX_RETRIES", default_value = "3")]
    pub http_retries: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Obtain a token bundle and show its expirations
    Authenticate,

    /// List products
    Products {
        #[arg(long)]
        from_country: Option<String>,
        #[arg(long)]
        to_country: Option<String>,
    },

    /// Search parcel shops in a country
    ParcelShops {
        /// ISO country code, e.g. NL
        country: String,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        fuzzy: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Pickup availability for a postal code
    PickupAvailability { country: String, postal_code: String },

    /// Fetch a label as JSON, or as PDF when --output is given
    Label {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub user_id: String,
    pub key: Option<String>,
    pub account_number: Option<String>,

    // Endpoints
    pub base_url: String,
    pub auth_url: String,
    pub refresh_url: String,

    // Token cache
    pub token_cache_file: PathBuf,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
    pub http_max_retries: u32,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Library defaults for an account
    pub fn new(user_id: impl Into<String>, key: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            key,
            account_number: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: auth_url_for(DEFAULT_BASE_URL),
            refresh_url: refresh_url_for(DEFAULT_BASE_URL),
            token_cache_file: default_token_cache_file(),
            http_connect_timeout: 10,
            http_request_timeout: 30,
            http_max_retries: 3,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
        }
    }

    /// Point the client (and both auth exchanges) at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.auth_url = auth_url_for(&base_url);
        self.refresh_url = refresh_url_for(&base_url);
        self.base_url = base_url;
        self
    }

    /// Build configuration from parsed CLI arguments with priority: CLI > ENV > defaults
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let user_id = args
            .user_id
            .clone()
            .context("DHL_USER_ID is required (use -u or set DHL_USER_ID env var)")?;

        let mut config = Config::new(user_id, args.key.clone()).with_base_url(&args.base_url);

        if let Some(url) = &args.auth_url {
            config.auth_url = url.clone();
        }
        if let Some(url) = &args.refresh_url {
            config.refresh_url = url.clone();
        }
        if let Some(path) = &args.token_cache_file {
            config.token_cache_file = expand_tilde(path);
        }

        config.account_number = args.account_number.clone();

        config.http_connect_timeout = std::env::var("HTTP_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.http_connect_timeout);
        config.http_request_timeout = args.http_timeout;
        config.http_max_retries = args.http_retries;

        config.log_level = args.log_level.clone();
        config.log_format = args.log_format;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            anyhow::bail!("DHL_USER_ID cannot be empty");
        }

        for (name, url) in [
            ("DHL_BASE_URL", &self.base_url),
            ("DHL_AUTH_URL", &self.auth_url),
            ("DHL_REFRESH_URL", &self.refresh_url),
        ] {
            reqwest::Url::parse(url).with_context(|| format!("{} is not a valid URL: {}", name, url))?;
        }

        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than zero");
        }

        Ok(())
    }
}

fn auth_url_for(base_url: &str) -> String {
    format!("{}/authenticate/api-key", base_url)
}

fn refresh_url_for(base_url: &str) -> String {
    format!("{}/authenticate/refresh-token", base_url)
}

/// Token cache location under the user's cache directory
pub fn default_token_cache_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dhlparcel")
        .join("tokens.sqlite3")
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/cache/tokens.sqlite3");
        assert!(path.to_string_lossy().ends_with("cache/tokens.sqlite3"));
        assert!(!path.to_string_lossy().starts_with('~'));

        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
        assert_eq!(expand_tilde("~"), PathBuf::from("~"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("u1", Some("k1".to_string()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.auth_url, "https://api-gw.dhlparcel.nl/authenticate/api-key");
        assert_eq!(
            config.refresh_url,
            "https://api-gw.dhlparcel.nl/authenticate/refresh-token"
        );
        assert!(config.token_cache_file.ends_with("dhlparcel/tokens.sqlite3"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_base_url_moves_auth_urls() {
        let config = Config::new("u1", None).with_base_url("http://127.0.0.1:1234/");
        assert_eq!(config.base_url, "http://127.0.0.1:1234");
        assert_eq!(config.auth_url, "http://127.0.0.1:1234/authenticate/api-key");
        assert_eq!(config.refresh_url, "http://127.0.0.1:1234/authenticate/refresh-token");
    }

    #[test]
    fn test_from_args() {
        let args = parse(&[
            "dhlparcel",
            "-u",
            "u1",
            "-k",
            "k1",
            "--base-url",
            "http://localhost:9000",
            "--refresh-url",
            "http://localhost:9001/refresh",
            "-c",
            "/tmp/dhl/tokens.sqlite3",
            "--log-format",
            "json",
            "--http-retries",
            "0",
            "authenticate",
        ]);
        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.user_id, "u1");
        assert_eq!(config.key.as_deref(), Some("k1"));
        assert_eq!(config.auth_url, "http://localhost:9000/authenticate/api-key");
        assert_eq!(config.refresh_url, "http://localhost:9001/refresh");
        assert_eq!(config.token_cache_file, PathBuf::from("/tmp/dhl/tokens.sqlite3"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.http_max_retries, 0);
        assert!(matches!(args.command, Command::Authenticate));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new("u1", None);
        config.refresh_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let config = Config::new("  ", None);
        assert!(config.validate().is_err());
    }
}
