//! Comment command implementation.

use std::io::Write;

use ece_client::api::comment::{
    self, Comment, CommentWithMeta, CommentsWithMetas, CreateParams, DeleteParams, ListParams,
    ResourceRef, ShowParams, UpdateParams,
};

use crate::cli::{CommentCommands, ResourceArgs};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{Message, OutputFormat, TableDisplay, or_dash, truncate};

/// Handler for comment subcommands.
pub struct CommentCommand<'a> {
    ctx: &'a Context,
}

impl<'a> CommentCommand<'a> {
    /// Creates a new comment command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the comment subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if validation or the API call fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &CommentCommands,
    ) -> Result<(), CliError> {
        let client = &self.ctx.client;
        match command {
            CommentCommands::Create { message, resource } => {
                let created = comment::create(
                    client,
                    &CreateParams {
                        resource: resource_ref(resource),
                        message,
                    },
                )
                .await?;
                format.write(out, &created)
            }
            CommentCommands::List { resource } => {
                let comments = comment::list(
                    client,
                    &ListParams {
                        resource_type: &resource.resource_type,
                        resource_id: &resource.resource_id,
                    },
                )
                .await?;
                format.write(out, &comments)
            }
            CommentCommands::Show {
                comment_id,
                resource,
            } => {
                let found = comment::show(
                    client,
                    &ShowParams {
                        resource: resource_ref(resource),
                        comment_id,
                    },
                )
                .await?;
                format.write(out, &found)
            }
            CommentCommands::Update {
                comment_id,
                message,
                resource,
                version,
            } => {
                let updated = comment::update(
                    client,
                    &UpdateParams {
                        resource: resource_ref(resource),
                        comment_id,
                        message,
                        version: version.as_deref(),
                    },
                )
                .await?;
                format.write(out, &updated)
            }
            CommentCommands::Delete {
                comment_id,
                resource,
                version,
            } => {
                comment::delete(
                    client,
                    &DeleteParams {
                        resource: resource_ref(resource),
                        comment_id,
                        version: version.as_deref(),
                    },
                )
                .await?;
                format.write(out, &Message::new(format!("Comment {comment_id} deleted")))
            }
        }
    }
}

fn resource_ref(args: &ResourceArgs) -> ResourceRef<'_> {
    ResourceRef {
        resource_type: &args.resource_type,
        resource_id: &args.resource_id,
    }
}

impl TableDisplay for Comment {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "ID:       {}", self.id)?;
        writeln!(writer, "User:     {}", or_dash(self.user_id.as_deref()))?;
        writeln!(writer, "Message:  {}", self.message)?;
        Ok(())
    }
}

impl TableDisplay for CommentWithMeta {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        self.comment.write_table(writer)?;
        let meta = &self.metadata;
        if let Some(created) = meta.created_time {
            writeln!(writer, "Created:  {}", created.to_rfc3339())?;
        }
        if let Some(modified) = meta.modified_time {
            writeln!(writer, "Modified: {}", modified.to_rfc3339())?;
        }
        writeln!(writer, "Version:  {}", or_dash(meta.version.as_deref()))?;
        Ok(())
    }
}

impl TableDisplay for CommentsWithMetas {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.values.is_empty() {
            writeln!(writer, "No comments found.")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<24} {:<16} {:<8} {:<20} MESSAGE",
            "ID", "USER", "VERSION", "CREATED"
        )?;
        for entry in &self.values {
            let created = entry
                .metadata
                .created_time
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
            writeln!(
                writer,
                "{:<24} {:<16} {:<8} {:<20} {}",
                truncate(&entry.comment.id, 24),
                truncate(or_dash(entry.comment.user_id.as_deref()), 16),
                or_dash(entry.metadata.version.as_deref()),
                created,
                truncate(&entry.comment.message, 60)
            )?;
        }
        Ok(())
    }
}
