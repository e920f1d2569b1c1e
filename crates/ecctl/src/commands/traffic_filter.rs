//! Traffic filter command implementation.

use std::io::Write;

use ece_client::api::traffic_filter::{
    self, AssociationParams, ListParams, TrafficFilterRule, TrafficFilterRulesetInfo,
    TrafficFilterRulesetRequest, TrafficFilterRulesets,
};

use super::read_json_file;
use crate::cli::{AssociationCommands, EntityArgs, TrafficFilterCommands};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{Message, OutputFormat, TableDisplay, or_dash, truncate};

/// Handler for traffic-filter subcommands.
pub struct TrafficFilterCommand<'a> {
    ctx: &'a Context,
}

impl<'a> TrafficFilterCommand<'a> {
    /// Creates a new traffic-filter command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the traffic-filter subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if validation, a file read, or an API call fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &TrafficFilterCommands,
    ) -> Result<(), CliError> {
        let client = &self.ctx.client;
        match command {
            TrafficFilterCommands::Create {
                name,
                ruleset_type,
                sources,
                description,
                include_by_default,
            } => {
                let region = self.ctx.require_region("creating a traffic filter ruleset")?;
                let request = TrafficFilterRulesetRequest {
                    name: name.clone(),
                    ruleset_type: (*ruleset_type).into(),
                    region: region.to_string(),
                    description: description.clone(),
                    include_by_default: *include_by_default,
                    rules: sources
                        .iter()
                        .map(|source| TrafficFilterRule {
                            source: Some(source.clone()),
                            ..TrafficFilterRule::default()
                        })
                        .collect(),
                };
                let created = traffic_filter::create(client, &request).await?;
                format.write(out, &created)
            }
            TrafficFilterCommands::Delete {
                ruleset_id,
                ignore_associations,
            } => {
                traffic_filter::delete(client, ruleset_id, *ignore_associations).await?;
                format.write(out, &Message::new(format!("Ruleset {ruleset_id} deleted")))
            }
            TrafficFilterCommands::List {
                include_associations,
                single_region,
            } => {
                let region = if *single_region {
                    Some(self.ctx.require_region("--single-region")?)
                } else {
                    None
                };
                let rulesets = traffic_filter::list(
                    client,
                    &ListParams {
                        region,
                        include_associations: *include_associations,
                    },
                )
                .await?;
                format.write(out, &rulesets)
            }
            TrafficFilterCommands::Show {
                ruleset_id,
                include_associations,
            } => {
                let ruleset = traffic_filter::show(client, ruleset_id, *include_associations).await?;
                format.write(out, &ruleset)
            }
            TrafficFilterCommands::Update { ruleset_id, file } => {
                let request: TrafficFilterRulesetRequest = read_json_file(file).await?;
                let updated = traffic_filter::update(client, ruleset_id, &request).await?;
                format.write(out, &updated)
            }
            TrafficFilterCommands::Association { command } => {
                self.association(out, format, command).await
            }
        }
    }

    async fn association<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &AssociationCommands,
    ) -> Result<(), CliError> {
        let client = &self.ctx.client;
        match command {
            AssociationCommands::Create { ruleset_id, entity } => {
                traffic_filter::create_association(client, association(ruleset_id, entity)).await?;
                format.write(
                    out,
                    &Message::new(format!(
                        "Associated ruleset {ruleset_id} with {} {}",
                        entity.entity_type, entity.entity_id
                    )),
                )
            }
            AssociationCommands::Delete { ruleset_id, entity } => {
                traffic_filter::delete_association(client, association(ruleset_id, entity)).await?;
                format.write(
                    out,
                    &Message::new(format!(
                        "Removed ruleset {ruleset_id} from {} {}",
                        entity.entity_type, entity.entity_id
                    )),
                )
            }
            AssociationCommands::List { entity } => {
                let rulesets =
                    traffic_filter::list_associated(client, &entity.entity_type, &entity.entity_id)
                        .await?;
                format.write(out, &rulesets)
            }
        }
    }
}

fn association<'a>(ruleset_id: &'a str, entity: &'a EntityArgs) -> AssociationParams<'a> {
    AssociationParams {
        ruleset_id,
        entity_type: &entity.entity_type,
        entity_id: &entity.entity_id,
    }
}

impl TableDisplay for TrafficFilterRulesetInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "ID:                 {}", self.id)?;
        writeln!(writer, "Name:               {}", self.name)?;
        writeln!(writer, "Type:               {}", self.ruleset_type)?;
        writeln!(writer, "Region:             {}", self.region)?;
        if let Some(description) = &self.description {
            writeln!(writer, "Description:        {description}")?;
        }
        writeln!(writer, "Include by default: {}", self.include_by_default)?;

        writeln!(writer, "Rules:")?;
        for rule in &self.rules {
            writeln!(
                writer,
                "  {:<40} {}",
                or_dash(rule.source.as_deref()),
                or_dash(rule.description.as_deref())
            )?;
        }

        if let Some(associations) = &self.associations {
            writeln!(writer, "Associations:")?;
            for assoc in associations {
                writeln!(writer, "  {:<12} {}", assoc.entity_type, assoc.id)?;
            }
        }
        Ok(())
    }
}

impl TableDisplay for TrafficFilterRulesets {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.rulesets.is_empty() {
            writeln!(writer, "No rulesets found.")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<34} {:<28} {:<12} {:<20} {:<6} DEFAULT",
            "ID", "NAME", "TYPE", "REGION", "RULES"
        )?;
        for ruleset in &self.rulesets {
            writeln!(
                writer,
                "{:<34} {:<28} {:<12} {:<20} {:<6} {}",
                truncate(&ruleset.id, 34),
                truncate(&ruleset.name, 28),
                truncate(&ruleset.ruleset_type, 12),
                truncate(&ruleset.region, 20),
                ruleset.rules.len(),
                ruleset.include_by_default
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Format, RulesetTypeArg};
    use ece_client::testing::{MockApi, MockResponse};
    use serde_json::{Value, json};
    use tempfile::TempDir;

    async fn run(
        mock: &MockApi,
        region: Option<&str>,
        format: Format,
        command: TrafficFilterCommands,
    ) -> Result<String, CliError> {
        let ctx = Context::new(mock.client(), region.map(str::to_string));
        let mut out = Vec::new();
        TrafficFilterCommand::new(&ctx)
            .execute(&mut out, &OutputFormat::new(format), &command)
            .await?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    fn ruleset_json() -> Value {
        json!({
            "id": "rs-1",
            "name": "office",
            "type": "ip",
            "region": "ece-region",
            "include_by_default": false,
            "rules": [{"id": "r1", "source": "10.0.0.0/8"}],
            "associations": [{"entity_type": "deployment", "id": "d1"}],
            "total_associations": 1
        })
    }

    fn entity() -> EntityArgs {
        EntityArgs {
            entity_type: "deployment".into(),
            entity_id: "d1".into(),
        }
    }

    #[tokio::test]
    async fn create_builds_one_rule_per_source() {
        let mock = MockApi::start([MockResponse::json(201, json!({"id": "rs-1"}))])
            .await
            .expect("mock");

        let output = run(
            &mock,
            Some("ece-region"),
            Format::Text,
            TrafficFilterCommands::Create {
                name: "office".into(),
                ruleset_type: RulesetTypeArg::Ip,
                sources: vec!["10.0.0.0/8".into(), "192.168.1.1".into()],
                description: Some("office network".into()),
                include_by_default: true,
            },
        )
        .await
        .expect("create");

        assert_eq!(output, "rs-1\n");
        let request = mock.single_request();
        assert_eq!(request.path, "/api/v1/deployments/traffic-filter/rulesets");
        assert_eq!(
            request.json().expect("json"),
            json!({
                "name": "office",
                "type": "ip",
                "region": "ece-region",
                "description": "office network",
                "include_by_default": true,
                "rules": [{"source": "10.0.0.0/8"}, {"source": "192.168.1.1"}]
            })
        );
    }

    #[tokio::test]
    async fn create_requires_region() {
        let mock = MockApi::idle().await.expect("mock");

        let err = run(
            &mock,
            None,
            Format::Text,
            TrafficFilterCommands::Create {
                name: "office".into(),
                ruleset_type: RulesetTypeArg::Vpce,
                sources: vec!["vpce-1".into()],
                description: None,
                include_by_default: false,
            },
        )
        .await
        .expect_err("should fail");

        assert!(matches!(err, CliError::InvalidArgument(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn list_sends_region_only_for_single_region() {
        let mock = MockApi::start([
            MockResponse::ok(json!({"rulesets": [ruleset_json()]})),
            MockResponse::ok(json!({"rulesets": []})),
        ])
        .await
        .expect("mock");

        let output = run(
            &mock,
            Some("ece-region"),
            Format::Text,
            TrafficFilterCommands::List {
                include_associations: true,
                single_region: false,
            },
        )
        .await
        .expect("list");
        assert!(output.contains("rs-1"));
        assert!(output.contains("office"));

        let empty = run(
            &mock,
            Some("ece-region"),
            Format::Text,
            TrafficFilterCommands::List {
                include_associations: false,
                single_region: true,
            },
        )
        .await
        .expect("list");
        assert_eq!(empty, "No rulesets found.\n");

        let requests = mock.requests();
        assert_eq!(requests[0].query_param("region"), None);
        assert_eq!(requests[0].query_param("include_associations").as_deref(), Some("true"));
        assert_eq!(requests[1].query_param("region").as_deref(), Some("ece-region"));
    }

    #[tokio::test]
    async fn show_renders_rules_and_associations() {
        let mock = MockApi::start([MockResponse::ok(ruleset_json())]).await.expect("mock");

        let output = run(
            &mock,
            None,
            Format::Text,
            TrafficFilterCommands::Show {
                ruleset_id: "rs-1".into(),
                include_associations: true,
            },
        )
        .await
        .expect("show");

        assert!(output.contains("Region:             ece-region"));
        assert!(output.contains("10.0.0.0/8"));
        assert!(output.contains("deployment"));
        assert!(output.contains("d1"));
    }

    #[tokio::test]
    async fn update_sends_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("ruleset.json");
        let body = json!({
            "name": "office",
            "type": "ip",
            "region": "ece-region",
            "include_by_default": false,
            "rules": [{"id": "r1", "source": "10.0.0.0/16"}]
        });
        std::fs::write(&path, body.to_string()).expect("write");
        let mock = MockApi::start([MockResponse::ok(json!({"id": "rs-1"}))])
            .await
            .expect("mock");

        run(
            &mock,
            None,
            Format::Json,
            TrafficFilterCommands::Update {
                ruleset_id: "rs-1".into(),
                file: path,
            },
        )
        .await
        .expect("update");

        let request = mock.single_request();
        assert_eq!(request.method, "PUT");
        assert_eq!(request.json().expect("json"), body);
    }

    #[tokio::test]
    async fn delete_with_ignore_associations() {
        let mock = MockApi::start([MockResponse::empty()]).await.expect("mock");

        let output = run(
            &mock,
            None,
            Format::Text,
            TrafficFilterCommands::Delete {
                ruleset_id: "rs-1".into(),
                ignore_associations: true,
            },
        )
        .await
        .expect("delete");

        assert_eq!(output, "Ruleset rs-1 deleted\n");
        assert_eq!(
            mock.single_request().query_param("ignore_associations").as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn association_lifecycle() {
        let mock = MockApi::start([
            MockResponse::json(201, json!({})),
            MockResponse::ok(json!({"rulesets": [ruleset_json()]})),
            MockResponse::empty(),
        ])
        .await
        .expect("mock");

        let created = run(
            &mock,
            None,
            Format::Text,
            TrafficFilterCommands::Association {
                command: AssociationCommands::Create {
                    ruleset_id: "rs-1".into(),
                    entity: entity(),
                },
            },
        )
        .await
        .expect("create");
        assert_eq!(created, "Associated ruleset rs-1 with deployment d1\n");

        run(
            &mock,
            None,
            Format::Text,
            TrafficFilterCommands::Association {
                command: AssociationCommands::List { entity: entity() },
            },
        )
        .await
        .expect("list");

        run(
            &mock,
            None,
            Format::Text,
            TrafficFilterCommands::Association {
                command: AssociationCommands::Delete {
                    ruleset_id: "rs-1".into(),
                    entity: entity(),
                },
            },
        )
        .await
        .expect("delete");

        let calls: Vec<_> = mock
            .requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        assert_eq!(
            calls,
            vec![
                "POST /api/v1/deployments/traffic-filter/rulesets/rs-1/associations",
                "GET /api/v1/deployments/traffic-filter/associations/deployment/d1/rulesets",
                "DELETE /api/v1/deployments/traffic-filter/rulesets/rs-1/associations/deployment/d1",
            ]
        );
    }
}
