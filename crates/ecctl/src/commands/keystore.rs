//! Elasticsearch keystore command implementation.
//!
//! Every subcommand addresses the keystore of one Elasticsearch resource.
//! Without `--ref-id` the first Elasticsearch resource of the deployment is
//! used.

use std::io::Write;
use std::path::Path;

use ece_client::api::deployment;
use ece_client::api::keystore::{self, KeystoreContents, KeystoreRef, KeystoreSecret, SetParams};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{read_file, read_json_file};
use crate::cli::KeystoreCommands;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputFormat, TableDisplay};

/// Handler for keystore subcommands.
pub struct KeystoreCommand<'a> {
    ctx: &'a Context,
}

impl<'a> KeystoreCommand<'a> {
    /// Creates a new keystore command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the keystore subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if validation, a file read, or an API call fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &KeystoreCommands,
    ) -> Result<(), CliError> {
        match command {
            KeystoreCommands::Show {
                deployment_id,
                ref_id,
            } => {
                let ref_id = self.ref_id(deployment_id, ref_id.as_deref()).await?;
                let contents = keystore::get(&self.ctx.client, keystore_ref(deployment_id, &ref_id)).await?;
                format.write(out, &contents)
            }
            KeystoreCommands::Get {
                deployment_id,
                setting,
                ref_id,
            } => {
                let ref_id = self.ref_id(deployment_id, ref_id.as_deref()).await?;
                let contents = keystore::get(&self.ctx.client, keystore_ref(deployment_id, &ref_id)).await?;
                let secret = contents.secrets.get(setting).ok_or_else(|| {
                    CliError::NotFound(format!(
                        "keystore setting {setting} in deployment {deployment_id}"
                    ))
                })?;
                format.write(
                    out,
                    &KeystoreSetting {
                        name: setting.clone(),
                        as_file: secret.as_file.unwrap_or(false),
                    },
                )
            }
            KeystoreCommands::Set {
                deployment_id,
                setting,
                value,
                file,
                as_file,
                ref_id,
            } => {
                let value = match (value, file) {
                    (Some(value), _) => value.clone(),
                    (None, Some(path)) => read_value(path).await?,
                    (None, None) => {
                        return Err(CliError::InvalidArgument(
                            "one of --value or --file is required".into(),
                        ));
                    }
                };
                if value.trim().is_empty() {
                    return Err(CliError::InvalidArgument("value cannot be empty".into()));
                }
                let mut contents = KeystoreContents::default();
                contents.secrets.insert(
                    setting.clone(),
                    KeystoreSecret {
                        value: Some(Value::String(value)),
                        as_file: Some(*as_file),
                    },
                );
                self.apply(out, format, deployment_id, ref_id.as_deref(), &contents)
                    .await
            }
            KeystoreCommands::Update {
                deployment_id,
                file,
                ref_id,
            } => {
                let contents: KeystoreContents = read_json_file(file).await?;
                self.apply(out, format, deployment_id, ref_id.as_deref(), &contents)
                    .await
            }
        }
    }

    async fn ref_id(&self, deployment_id: &str, ref_id: Option<&str>) -> Result<String, CliError> {
        let resolved =
            deployment::resolve_elasticsearch_ref_id(&self.ctx.client, deployment_id, ref_id).await?;
        debug!(deployment_id, ref_id = %resolved, "using Elasticsearch resource");
        Ok(resolved)
    }

    async fn apply<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        deployment_id: &str,
        ref_id: Option<&str>,
        contents: &KeystoreContents,
    ) -> Result<(), CliError> {
        // Before the ref ID lookup: an empty document sends no request at all.
        if contents.secrets.is_empty() {
            return Err(CliError::InvalidArgument("keystore contents have no secrets".into()));
        }
        let ref_id = self.ref_id(deployment_id, ref_id).await?;
        let updated = keystore::set(
            &self.ctx.client,
            &SetParams {
                keystore: keystore_ref(deployment_id, &ref_id),
                contents,
            },
        )
        .await?;
        format.write(out, &updated)
    }
}

fn keystore_ref<'a>(deployment_id: &'a str, ref_id: &'a str) -> KeystoreRef<'a> {
    KeystoreRef {
        deployment_id,
        ref_id,
    }
}

/// Read a secret value from a file. Only UTF-8 content can be sent.
async fn read_value(path: &Path) -> Result<String, CliError> {
    let bytes = read_file(path).await?;
    String::from_utf8(bytes).map_err(|_| {
        CliError::InvalidArgument(format!("{} is not valid UTF-8", path.display()))
    })
}

/// A single keystore setting. Values are never returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct KeystoreSetting {
    /// Setting name.
    pub name: String,
    /// Whether the value is stored as a file.
    pub as_file: bool,
}

impl TableDisplay for KeystoreSetting {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Name:     {}", self.name)?;
        writeln!(writer, "As file:  {}", self.as_file)?;
        Ok(())
    }
}

impl TableDisplay for KeystoreContents {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.secrets.is_empty() {
            writeln!(writer, "Keystore is empty.")?;
            return Ok(());
        }

        writeln!(writer, "{:<48} AS FILE", "SETTING")?;
        for (name, secret) in &self.secrets {
            writeln!(writer, "{:<48} {}", name, secret.as_file.unwrap_or(false))?;
        }
        Ok(())
    }
}
