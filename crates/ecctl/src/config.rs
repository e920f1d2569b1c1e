//! Configuration loading.
//!
//! Settings come from three places, highest precedence first:
//! - Command-line flags and their `EC_*` environment variables
//! - The config file (`~/.ecctl/config.json` or `config.toml`, or `--config`)
//! - Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use ece_client::{ApiConfig, Auth, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{Cli, Format};
use crate::error::CliError;

/// Directory under the home directory holding the config file.
const CONFIG_DIR: &str = ".ecctl";

/// Config file names tried in order when `--config` is not given.
const CONFIG_FILES: [&str; 2] = ["config.json", "config.toml"];

/// Contents of a config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// API host.
    #[serde(default)]
    pub host: Option<String>,
    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Basic auth username.
    #[serde(default)]
    pub user: Option<String>,
    /// Basic auth password.
    #[serde(default)]
    pub pass: Option<String>,
    /// Region.
    #[serde(default)]
    pub region: Option<String>,
    /// Output format.
    #[serde(default)]
    pub output: Option<Format>,
    /// Skip TLS verification.
    #[serde(default)]
    pub insecure: Option<bool>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl FileConfig {
    /// Load a config file. `.toml` files are parsed as TOML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        };
        parsed.map_err(|message| CliError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns the parser message if the JSON is invalid.
    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))
    }

    /// Parse a TOML config document.
    ///
    /// # Errors
    ///
    /// Returns the parser message if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("invalid TOML: {e}"))
    }

    /// Load the explicit config file, or the first default one that exists.
    ///
    /// A missing explicit file is an error; missing default files are not.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), CliError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => dirs::home_dir().and_then(|home| find_default(&home.join(CONFIG_DIR))),
        };

        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                Ok((Self::from_file(&path)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }
}

/// First existing default config file in `dir`.
fn find_default(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Effective settings after merging flags, environment and config file.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API host, if configured.
    pub host: Option<String>,
    /// Credentials.
    pub auth: Auth,
    /// Region.
    pub region: Option<String>,
    /// Output format.
    pub output: Format,
    /// Skip TLS verification.
    pub insecure: bool,
    /// Request timeout.
    pub timeout: Duration,
    /// Config file the settings were read from.
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Merge command-line values over a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged settings are inconsistent.
    pub fn resolve(cli: &Cli, file: FileConfig, config_file: Option<PathBuf>) -> Result<Self, CliError> {
        let api_key = non_empty(cli.api_key.clone()).or_else(|| non_empty(file.api_key));
        let user = non_empty(cli.user.clone()).or_else(|| non_empty(file.user));
        let pass = non_empty(cli.pass.clone()).or_else(|| non_empty(file.pass));

        let auth = match (api_key, user, pass) {
            (Some(key), user, _) => {
                if user.is_some() {
                    debug!("api key set, ignoring user/pass");
                }
                Auth::ApiKey(key)
            }
            (None, Some(username), Some(password)) => Auth::Basic { username, password },
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(CliError::Config(
                    "both user and pass are required for basic authentication".into(),
                ));
            }
            (None, None, None) => Auth::None,
        };

        let timeout = match cli.timeout.or(file.timeout) {
            Some(0) => return Err(CliError::Config("timeout must be greater than zero".into())),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            host: non_empty(cli.host.clone()).or_else(|| non_empty(file.host)),
            auth,
            region: non_empty(cli.region.clone()).or_else(|| non_empty(file.region)),
            output: cli.output.or(file.output).unwrap_or_default(),
            insecure: cli.insecure || file.insecure.unwrap_or(false),
            timeout,
            config_file,
        })
    }

    /// Load the config file named by `cli` (or the default one) and merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the settings
    /// are inconsistent.
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let (file, path) = FileConfig::discover(cli.config.as_deref())?;
        Self::resolve(cli, file, path)
    }

    /// Client settings for the API.
    ///
    /// # Errors
    ///
    /// Returns an error if no host is configured.
    pub fn api_config(&self) -> Result<ApiConfig, CliError> {
        let host = self.host.as_deref().ok_or_else(|| {
            CliError::Config("no API host configured; set --host, EC_HOST or host in the config file".into())
        })?;

        Ok(ApiConfig::new(host)
            .with_auth(self.auth.clone())
            .with_insecure(self.insecure)
            .with_timeout(self.timeout)
            .with_user_agent(format!("ecctl/{}", env!("CARGO_PKG_VERSION"))))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
