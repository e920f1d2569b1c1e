//! Extension command implementation.
//!
//! Create and update are two-step when `--file` is given: the metadata call
//! first, then a multipart upload of the file to the extension it returned.

use std::io::Write;
use std::path::Path;

use ece_client::api::extension::{
    self, Extension, ExtensionRequest, Extensions, ShowParams, UploadParams,
};
use tracing::{info, warn};

use super::read_file;
use crate::cli::{ExtensionArgs, ExtensionCommands};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{Message, OutputFormat, TableDisplay, or_dash, truncate};

/// Handler for extension subcommands.
pub struct ExtensionCommand<'a> {
    ctx: &'a Context,
}

impl<'a> ExtensionCommand<'a> {
    /// Creates a new extension command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the extension subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if validation, a file read, or an API call fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &ExtensionCommands,
    ) -> Result<(), CliError> {
        let client = &self.ctx.client;
        match command {
            ExtensionCommands::Create { name, args } => {
                // The file is read before anything is created.
                let upload = load_upload(args.file.as_deref()).await?;
                let created = extension::create(client, &request(name, args)).await?;
                info!(extension_id = %created.id, "created extension");
                let shown = self.upload(created, upload).await?;
                format.write(out, &shown)
            }
            ExtensionCommands::List => {
                let all = extension::list(client).await?;
                format.write(out, &all)
            }
            ExtensionCommands::Show {
                extension_id,
                include_deployments,
            } => {
                let found = extension::show(
                    client,
                    &ShowParams {
                        extension_id,
                        include_deployments: *include_deployments,
                    },
                )
                .await?;
                format.write(out, &found)
            }
            ExtensionCommands::Update {
                extension_id,
                name,
                args,
            } => {
                let upload = load_upload(args.file.as_deref()).await?;
                let updated = extension::update(client, extension_id, &request(name, args)).await?;
                let shown = self.upload(updated, upload).await?;
                format.write(out, &shown)
            }
            ExtensionCommands::Delete { extension_id } => {
                extension::delete(client, extension_id).await?;
                format.write(out, &Message::new(format!("Extension {extension_id} deleted")))
            }
        }
    }

    /// Upload the file, if any, to `ext`. Returns what should be printed.
    async fn upload(&self, ext: Extension, upload: Option<Upload>) -> Result<Extension, CliError> {
        let Some(upload) = upload else {
            return Ok(ext);
        };

        let result = extension::upload(
            &self.ctx.client,
            UploadParams {
                extension_id: &ext.id,
                file_name: &upload.file_name,
                contents: upload.contents,
            },
        )
        .await;

        match result {
            Ok(uploaded) => Ok(uploaded),
            Err(e) => {
                warn!(
                    extension_id = %ext.id,
                    file = %upload.file_name,
                    "extension metadata saved but file upload failed"
                );
                Err(e.into())
            }
        }
    }
}

/// A file to upload.
struct Upload {
    file_name: String,
    contents: Vec<u8>,
}

async fn load_upload(path: Option<&Path>) -> Result<Option<Upload>, CliError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidArgument(format!("{} is not a file", path.display())))?;
    let contents = read_file(path).await?;
    if contents.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "extension file {} is empty",
            path.display()
        )));
    }
    Ok(Some(Upload {
        file_name,
        contents,
    }))
}

fn request<'a>(name: &'a str, args: &'a ExtensionArgs) -> ExtensionRequest<'a> {
    ExtensionRequest {
        name,
        version: &args.version,
        extension_type: args.extension_type.into(),
        description: args.description.as_deref(),
        download_url: args.download_url.as_deref(),
    }
}

impl TableDisplay for Extension {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "ID:           {}", self.id)?;
        writeln!(writer, "Name:         {}", self.name)?;
        writeln!(writer, "Type:         {}", self.extension_type)?;
        writeln!(writer, "Version:      {}", self.version)?;
        writeln!(writer, "URL:          {}", or_dash(Some(self.url.as_str())))?;
        if let Some(description) = &self.description {
            writeln!(writer, "Description:  {description}")?;
        }
        if let Some(download_url) = &self.download_url {
            writeln!(writer, "Download URL: {download_url}")?;
        }
        if let Some(file) = &self.file_metadata {
            let size = file.size.map_or_else(|| "-".to_string(), |s| format!("{s} bytes"));
            writeln!(writer, "File size:    {size}")?;
            if let Some(modified) = file.last_modified_date {
                writeln!(writer, "Uploaded:     {}", modified.to_rfc3339())?;
            }
        }
        if let Some(deployments) = &self.deployments {
            if deployments.is_empty() {
                writeln!(writer, "Deployments:  none")?;
            } else {
                writeln!(writer, "Deployments:")?;
                for id in deployments {
                    writeln!(writer, "  {id}")?;
                }
            }
        }
        Ok(())
    }
}

impl TableDisplay for Extensions {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.extensions.is_empty() {
            writeln!(writer, "No extensions found.")?;
            return Ok(());
        }

        writeln!(writer, "{:<24} {:<32} {:<8} VERSION", "ID", "NAME", "TYPE")?;
        for ext in &self.extensions {
            writeln!(
                writer,
                "{:<24} {:<32} {:<8} {}",
                truncate(&ext.id, 24),
                truncate(&ext.name, 32),
                ext.extension_type,
                ext.version
            )?;
        }
        Ok(())
    }
}
