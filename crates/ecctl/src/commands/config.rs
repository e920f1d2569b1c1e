//! `config show`: the effective configuration with credentials masked.

use std::io::Write;

use ece_client::Auth;
use serde::Serialize;

use crate::cli::{ConfigCommands, Format};
use crate::config::Settings;
use crate::error::CliError;
use crate::output::{OutputFormat, TableDisplay, or_dash};

const MASK: &str = "****";

/// Handler for config subcommands. Runs without contacting the API.
pub struct ConfigCommand<'a> {
    settings: &'a Settings,
}

impl<'a> ConfigCommand<'a> {
    /// Creates a new config command handler.
    #[must_use]
    pub const fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Executes the config subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if writing the output fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &ConfigCommands,
    ) -> Result<(), CliError> {
        match command {
            ConfigCommands::Show => format.write(out, &ConfigView::from(self.settings)),
        }
    }
}

/// Printable view of [`Settings`].
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    /// API host.
    pub host: Option<String>,
    /// Region.
    pub region: Option<String>,
    /// Output format.
    pub output: Format,
    /// `none`, `apikey` or `basic`.
    pub auth: &'static str,
    /// Masked API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'static str>,
    /// Basic auth username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Masked password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<&'static str>,
    /// TLS verification disabled.
    pub insecure: bool,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Config file in use.
    pub config_file: Option<String>,
}

impl From<&Settings> for ConfigView {
    fn from(settings: &Settings) -> Self {
        let (api_key, user, pass) = match &settings.auth {
            Auth::None => (None, None, None),
            Auth::ApiKey(_) => (Some(MASK), None, None),
            Auth::Basic { username, .. } => (None, Some(username.clone()), Some(MASK)),
        };
        Self {
            host: settings.host.clone(),
            region: settings.region.clone(),
            output: settings.output,
            auth: settings.auth.method(),
            api_key,
            user,
            pass,
            insecure: settings.insecure,
            timeout: settings.timeout.as_secs(),
            config_file: settings
                .config_file
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

impl TableDisplay for ConfigView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let output = match self.output {
            Format::Text => "text",
            Format::Json => "json",
        };
        writeln!(writer, "Host:        {}", or_dash(self.host.as_deref()))?;
        writeln!(writer, "Region:      {}", or_dash(self.region.as_deref()))?;
        writeln!(writer, "Output:      {output}")?;
        writeln!(writer, "Auth:        {}", self.auth)?;
        if let Some(key) = self.api_key {
            writeln!(writer, "API key:     {key}")?;
        }
        if let Some(user) = &self.user {
            writeln!(writer, "User:        {user}")?;
        }
        if let Some(pass) = self.pass {
            writeln!(writer, "Password:    {pass}")?;
        }
        writeln!(writer, "Insecure:    {}", self.insecure)?;
        writeln!(writer, "Timeout:     {}s", self.timeout)?;
        writeln!(writer, "Config file: {}", or_dash(self.config_file.as_deref()))?;
        Ok(())
    }
}
