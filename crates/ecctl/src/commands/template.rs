//! Deployment template command implementation.
//!
//! Every call carries the configured region.

use std::io::Write;

use ece_client::api::template::{
    self, CreateParams, DeploymentTemplateInfo, ListParams, MetadataFilter, ShowParams,
    UpdateParams,
};
use serde_json::Value;

use super::read_json_file;
use crate::cli::TemplateCommands;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{Message, OutputFormat, TableDisplay, or_dash, truncate};

/// Handler for template subcommands.
pub struct TemplateCommand<'a> {
    ctx: &'a Context,
}

impl<'a> TemplateCommand<'a> {
    /// Creates a new template command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the template subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if validation, a file read, or an API call fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &TemplateCommands,
    ) -> Result<(), CliError> {
        let client = &self.ctx.client;
        let region = self.ctx.region();
        match command {
            TemplateCommands::Create {
                file,
                template_id,
                validate_only,
            } => {
                let definition: DeploymentTemplateInfo = read_json_file(file).await?;
                let created = template::create(
                    client,
                    &CreateParams {
                        template: &definition,
                        template_id: template_id.as_deref(),
                        region,
                        validate_only: *validate_only,
                    },
                )
                .await?;
                format.write(out, &created)
            }
            TemplateCommands::Delete { template_id } => {
                template::delete(client, template_id, region).await?;
                format.write(out, &Message::new(format!("Template {template_id} deleted")))
            }
            TemplateCommands::List {
                stack_version,
                filter,
                show_instance_configurations,
                hide_deprecated,
            } => {
                let metadata = filter.as_deref().map(MetadataFilter::parse).transpose()?;
                let templates = template::list(
                    client,
                    &ListParams {
                        region,
                        metadata,
                        stack_version: stack_version.as_deref(),
                        show_instance_configurations: *show_instance_configurations,
                        hide_deprecated: *hide_deprecated,
                    },
                )
                .await?;
                format.write(out, &templates)
            }
            TemplateCommands::Show {
                template_id,
                show_instance_configurations,
            } => {
                let found = template::show(
                    client,
                    &ShowParams {
                        template_id,
                        region,
                        show_instance_configurations: *show_instance_configurations,
                    },
                )
                .await?;
                format.write(out, &found)
            }
            TemplateCommands::Update {
                template_id,
                file,
                validate_only,
            } => {
                let definition: DeploymentTemplateInfo = read_json_file(file).await?;
                let updated = template::update(
                    client,
                    &UpdateParams {
                        template_id,
                        template: &definition,
                        region,
                        validate_only: *validate_only,
                    },
                )
                .await?;
                format.write(out, &updated)
            }
        }
    }
}

fn instance_configuration_count(info: &DeploymentTemplateInfo) -> Option<usize> {
    info.extra
        .get("instance_configurations")
        .and_then(Value::as_array)
        .map(Vec::len)
}

impl TableDisplay for DeploymentTemplateInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "ID:           {}", or_dash(self.id.as_deref()))?;
        writeln!(writer, "Name:         {}", self.name)?;
        if let Some(description) = &self.description {
            writeln!(writer, "Description:  {description}")?;
        }
        writeln!(writer, "Category:     {}", or_dash(self.template_category_id.as_deref()))?;
        writeln!(writer, "Min version:  {}", or_dash(self.min_version.as_deref()))?;
        writeln!(writer, "System owned: {}", self.system_owned.unwrap_or(false))?;
        if let Some(count) = instance_configuration_count(self) {
            writeln!(writer, "Instance configurations: {count}")?;
        }
        if !self.metadata.is_empty() {
            writeln!(writer, "Metadata:")?;
            for item in &self.metadata {
                writeln!(writer, "  {}: {}", item.key, item.value)?;
            }
        }
        Ok(())
    }
}

impl TableDisplay for Vec<DeploymentTemplateInfo> {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.is_empty() {
            writeln!(writer, "No templates found.")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<36} {:<40} {:<12} SYSTEM",
            "ID", "NAME", "MIN VERSION"
        )?;
        for info in self {
            writeln!(
                writer,
                "{:<36} {:<40} {:<12} {}",
                truncate(or_dash(info.id.as_deref()), 36),
                truncate(&info.name, 40),
                or_dash(info.min_version.as_deref()),
                info.system_owned.unwrap_or(false)
            )?;
        }
        Ok(())
    }
}
