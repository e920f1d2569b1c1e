//! Platform proxy settings command implementation.

use std::io::Write;

use ece_client::api::proxy::{self, ProxiesSettings, UpdateMode, UpdateParams};
use serde_json::Value;

use super::read_json_file;
use crate::cli::{ProxyCommands, ProxySettingsCommands};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputFormat, TableDisplay, or_dash};

/// Handler for proxy subcommands.
pub struct ProxyCommand<'a> {
    ctx: &'a Context,
}

impl<'a> ProxyCommand<'a> {
    /// Creates a new proxy command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the proxy subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if a file read or the API call fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &ProxyCommands,
    ) -> Result<(), CliError> {
        let ProxyCommands::Settings { command } = command;
        let client = &self.ctx.client;
        match command {
            ProxySettingsCommands::Show => {
                let settings = proxy::get(client).await?;
                format.write(out, &settings)
            }
            ProxySettingsCommands::Update {
                file,
                version,
                partial,
            } => {
                // Raw document: a merge must keep explicit nulls.
                let settings: Value = read_json_file(file).await?;
                let mode = if *partial {
                    UpdateMode::Merge
                } else {
                    UpdateMode::Replace
                };
                let updated = proxy::update(
                    client,
                    &UpdateParams {
                        settings: &settings,
                        version: version.as_deref(),
                        mode,
                    },
                )
                .await?;
                format.write(out, &updated)
            }
        }
    }
}

fn or_dash_num(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl TableDisplay for ProxiesSettings {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Proxy Settings")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Expected proxies:      {}", or_dash_num(self.expected_proxies_count))?;
        writeln!(
            writer,
            "Signature valid for:   {}",
            self.signature_valid_for_millis
                .map_or_else(|| "-".to_string(), |ms| format!("{ms} ms"))
        )?;
        writeln!(
            writer,
            "Signature secret:      {}",
            if self.signature_secret.is_some() { "set" } else { "-" }
        )?;

        if let Some(http) = &self.http_settings {
            writeln!(writer)?;
            writeln!(writer, "HTTP")?;
            writeln!(writer, "  Dashboards base URL: {}", or_dash(http.dashboards_base_url.as_deref()))?;
            writeln!(
                writer,
                "  Disconnected cutoff: {}",
                http.disconnected_cutoff
                    .map_or_else(|| "-".to_string(), |s| format!("{s} s"))
            )?;
            writeln!(writer, "  Min proxy services:  {}", or_dash_num(http.minimum_proxy_services))?;
            writeln!(
                writer,
                "  Cookie secret:       {}",
                if http.cookie_secret.is_some() { "set" } else { "-" }
            )?;
        }
        Ok(())
    }
}
