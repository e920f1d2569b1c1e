//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use ece_client::api::extension::ExtensionType;
use ece_client::api::traffic_filter::RulesetType;

/// ecctl - Elastic Cloud Enterprise administration.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.ecctl/config.json, then config.toml).
    #[arg(long, global = true, env = "EC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the ECE API, e.g. https://ece.example.com:12443.
    #[arg(long, global = true, env = "EC_HOST")]
    pub host: Option<String>,

    /// API key used for authentication.
    #[arg(long, global = true, env = "EC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Username for basic authentication.
    #[arg(long, global = true, env = "EC_USER")]
    pub user: Option<String>,

    /// Password for basic authentication.
    #[arg(long, global = true, env = "EC_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Region used by region-scoped commands.
    #[arg(long, global = true, env = "EC_REGION")]
    pub region: Option<String>,

    /// Output format.
    #[arg(short, long, global = true, env = "EC_OUTPUT", value_enum)]
    pub output: Option<Format>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true, env = "EC_INSECURE")]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "EC_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Log requests to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON documents as returned by the API.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage comments on platform resources.
    Comment {
        /// Comment subcommand to execute.
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// Manage deployments and their resources.
    Deployment {
        /// Deployment subcommand to execute.
        #[command(subcommand)]
        command: DeploymentCommands,
    },

    /// Manage the platform.
    Platform {
        /// Platform subcommand to execute.
        #[command(subcommand)]
        command: PlatformCommands,
    },

    /// Inspect ecctl configuration.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// The resource a comment belongs to.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ResourceArgs {
    /// Type of the commented resource, e.g. allocator.
    #[arg(long)]
    pub resource_type: String,

    /// ID of the commented resource.
    #[arg(long)]
    pub resource_id: String,
}

/// Comment subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum CommentCommands {
    /// Create a comment on a resource.
    Create {
        /// Comment text.
        message: String,
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// List the comments of a resource.
    List {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Show a comment.
    Show {
        /// Comment ID.
        comment_id: String,
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Replace the text of a comment.
    Update {
        /// Comment ID.
        comment_id: String,
        /// New comment text.
        message: String,
        #[command(flatten)]
        resource: ResourceArgs,
        /// Current version of the comment; the update fails if it changed.
        #[arg(long)]
        version: Option<String>,
    },

    /// Delete a comment.
    Delete {
        /// Comment ID.
        comment_id: String,
        #[command(flatten)]
        resource: ResourceArgs,
        /// Current version of the comment.
        #[arg(long)]
        version: Option<String>,
    },
}

/// Deployment subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DeploymentCommands {
    /// Manage Elasticsearch resources of a deployment.
    Elasticsearch {
        /// Elasticsearch subcommand to execute.
        #[command(subcommand)]
        command: ElasticsearchCommands,
    },

    /// Manage custom bundles and plugins.
    Extension {
        /// Extension subcommand to execute.
        #[command(subcommand)]
        command: ExtensionCommands,
    },

    /// Manage deployment templates.
    Template {
        /// Template subcommand to execute.
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Manage traffic filter rulesets.
    TrafficFilter {
        /// Traffic filter subcommand to execute.
        #[command(subcommand)]
        command: TrafficFilterCommands,
    },
}

/// Elasticsearch subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ElasticsearchCommands {
    /// Manage the Elasticsearch keystore.
    Keystore {
        /// Keystore subcommand to execute.
        #[command(subcommand)]
        command: KeystoreCommands,
    },
}

/// Keystore subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum KeystoreCommands {
    /// Show the names of the keystore settings.
    Show {
        /// Deployment ID.
        deployment_id: String,
        /// Elasticsearch ref ID (looked up when omitted).
        #[arg(long)]
        ref_id: Option<String>,
    },

    /// Show a single keystore setting.
    Get {
        /// Deployment ID.
        deployment_id: String,
        /// Setting name.
        setting: String,
        /// Elasticsearch ref ID (looked up when omitted).
        #[arg(long)]
        ref_id: Option<String>,
    },

    /// Add or replace a single keystore setting.
    Set {
        /// Deployment ID.
        deployment_id: String,
        /// Setting name.
        setting: String,
        /// Setting value.
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        value: Option<String>,
        /// Read the setting value from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Store the value as a file in the keystore.
        #[arg(long)]
        as_file: bool,
        /// Elasticsearch ref ID (looked up when omitted).
        #[arg(long)]
        ref_id: Option<String>,
    },

    /// Apply keystore settings from a JSON file.
    ///
    /// Settings with a null value are removed.
    Update {
        /// Deployment ID.
        deployment_id: String,
        /// JSON file with a `secrets` object.
        #[arg(long)]
        file: PathBuf,
        /// Elasticsearch ref ID (looked up when omitted).
        #[arg(long)]
        ref_id: Option<String>,
    },
}

/// Extension type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtensionTypeArg {
    /// A bundle of files.
    Bundle,
    /// An Elasticsearch plugin.
    Plugin,
}

impl From<ExtensionTypeArg> for ExtensionType {
    fn from(arg: ExtensionTypeArg) -> Self {
        match arg {
            ExtensionTypeArg::Bundle => Self::Bundle,
            ExtensionTypeArg::Plugin => Self::Plugin,
        }
    }
}

/// Extension metadata shared by create and update.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ExtensionArgs {
    /// Elasticsearch version the extension targets, e.g. 8.*.
    #[arg(long)]
    pub version: String,

    /// Extension type.
    #[arg(long = "type", value_enum)]
    pub extension_type: ExtensionTypeArg,

    /// Description.
    #[arg(long)]
    pub description: Option<String>,

    /// URL Elasticsearch downloads the extension from.
    #[arg(long, conflicts_with = "file")]
    pub download_url: Option<String>,

    /// Zip file to upload as the extension content.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Extension subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ExtensionCommands {
    /// Create an extension, optionally uploading its file.
    Create {
        /// Extension name.
        name: String,
        #[command(flatten)]
        args: ExtensionArgs,
    },

    /// List extensions.
    List,

    /// Show an extension.
    Show {
        /// Extension ID.
        extension_id: String,
        /// Include the deployments using the extension.
        #[arg(long)]
        include_deployments: bool,
    },

    /// Update an extension, optionally uploading a new file.
    Update {
        /// Extension ID.
        extension_id: String,
        /// Extension name.
        #[arg(long)]
        name: String,
        #[command(flatten)]
        args: ExtensionArgs,
    },

    /// Delete an extension.
    Delete {
        /// Extension ID.
        extension_id: String,
    },
}

/// Template subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TemplateCommands {
    /// Create a template from a JSON definition.
    Create {
        /// JSON template definition.
        #[arg(long)]
        file: PathBuf,
        /// Use this ID instead of a generated one.
        #[arg(long)]
        template_id: Option<String>,
        /// Only validate the definition.
        #[arg(long)]
        validate_only: bool,
    },

    /// Delete a template.
    Delete {
        /// Template ID.
        template_id: String,
    },

    /// List templates.
    List {
        /// Only templates supporting this stack version.
        #[arg(long)]
        stack_version: Option<String>,
        /// Metadata filter in key:value form.
        #[arg(long)]
        filter: Option<String>,
        /// Include instance configurations.
        #[arg(long)]
        show_instance_configurations: bool,
        /// Omit deprecated templates.
        #[arg(long)]
        hide_deprecated: bool,
    },

    /// Show a template.
    Show {
        /// Template ID.
        template_id: String,
        /// Include instance configurations.
        #[arg(long)]
        show_instance_configurations: bool,
    },

    /// Replace a template with a JSON definition.
    Update {
        /// Template ID.
        template_id: String,
        /// JSON template definition.
        #[arg(long)]
        file: PathBuf,
        /// Only validate the definition.
        #[arg(long)]
        validate_only: bool,
    },
}

/// Ruleset type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RulesetTypeArg {
    /// IP addresses and CIDR ranges.
    Ip,
    /// AWS VPC endpoints.
    Vpce,
    /// Azure private endpoints.
    #[value(name = "azure_private_endpoint")]
    AzurePrivateEndpoint,
    /// GCP Private Service Connect endpoints.
    #[value(name = "gcp_private_service_connect_endpoint")]
    GcpPrivateServiceConnectEndpoint,
}

impl From<RulesetTypeArg> for RulesetType {
    fn from(arg: RulesetTypeArg) -> Self {
        match arg {
            RulesetTypeArg::Ip => Self::Ip,
            RulesetTypeArg::Vpce => Self::Vpce,
            RulesetTypeArg::AzurePrivateEndpoint => Self::AzurePrivateEndpoint,
            RulesetTypeArg::GcpPrivateServiceConnectEndpoint => {
                Self::GcpPrivateServiceConnectEndpoint
            }
        }
    }
}

/// Traffic filter subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TrafficFilterCommands {
    /// Create a ruleset in the configured region.
    Create {
        /// Ruleset name.
        #[arg(long)]
        name: String,
        /// Ruleset type.
        #[arg(long = "type", value_enum)]
        ruleset_type: RulesetTypeArg,
        /// Allowed source; repeat for several rules.
        #[arg(long = "source", required = true)]
        sources: Vec<String>,
        /// Description.
        #[arg(long)]
        description: Option<String>,
        /// Apply the ruleset to new deployments automatically.
        #[arg(long)]
        include_by_default: bool,
    },

    /// Delete a ruleset.
    Delete {
        /// Ruleset ID.
        ruleset_id: String,
        /// Remove the ruleset from associated deployments first.
        #[arg(long)]
        ignore_associations: bool,
    },

    /// List rulesets.
    List {
        /// Include associations.
        #[arg(long)]
        include_associations: bool,
        /// Only list rulesets of the configured region.
        #[arg(long)]
        single_region: bool,
    },

    /// Show a ruleset.
    Show {
        /// Ruleset ID.
        ruleset_id: String,
        /// Include associations.
        #[arg(long)]
        include_associations: bool,
    },

    /// Replace a ruleset with a JSON definition.
    Update {
        /// Ruleset ID.
        ruleset_id: String,
        /// JSON ruleset definition.
        #[arg(long)]
        file: PathBuf,
    },

    /// Manage ruleset associations.
    Association {
        /// Association subcommand to execute.
        #[command(subcommand)]
        command: AssociationCommands,
    },
}

/// The entity side of an association.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EntityArgs {
    /// Entity type.
    #[arg(long, default_value = "deployment")]
    pub entity_type: String,

    /// Entity ID.
    #[arg(long = "id")]
    pub entity_id: String,
}

/// Association subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AssociationCommands {
    /// Associate a ruleset with an entity.
    Create {
        /// Ruleset ID.
        ruleset_id: String,
        #[command(flatten)]
        entity: EntityArgs,
    },

    /// Remove an association.
    Delete {
        /// Ruleset ID.
        ruleset_id: String,
        #[command(flatten)]
        entity: EntityArgs,
    },

    /// List the rulesets associated with an entity.
    List {
        #[command(flatten)]
        entity: EntityArgs,
    },
}

/// Platform subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum PlatformCommands {
    /// Manage platform proxies.
    Proxy {
        /// Proxy subcommand to execute.
        #[command(subcommand)]
        command: ProxyCommands,
    },
}

/// Proxy subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ProxyCommands {
    /// Manage proxy settings.
    Settings {
        /// Settings subcommand to execute.
        #[command(subcommand)]
        command: ProxySettingsCommands,
    },
}

/// Proxy settings subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ProxySettingsCommands {
    /// Show the proxy settings.
    Show,

    /// Write proxy settings from a JSON file.
    Update {
        /// JSON settings file.
        #[arg(long)]
        file: PathBuf,
        /// Current settings version; the update fails if it changed.
        #[arg(long)]
        version: Option<String>,
        /// Merge into the current settings instead of replacing them.
        #[arg(long)]
        partial: bool,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration.
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use test_case::test_case;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("ecctl").chain(args.iter().copied()))
    }

    #[test]
    fn cli_help_does_not_panic() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_global_flags() {
        let cli = parse(&[
            "--host",
            "https://ece:12443",
            "--api-key",
            "k",
            "--region",
            "ece-region",
            "-o",
            "json",
            "--insecure",
            "--timeout",
            "5",
            "config",
            "show",
        ])
        .expect("parse");

        assert_eq!(cli.host.as_deref(), Some("https://ece:12443"));
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.region.as_deref(), Some("ece-region"));
        assert_eq!(cli.output, Some(Format::Json));
        assert!(cli.insecure);
        assert_eq!(cli.timeout, Some(5));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["comment", "list", "--resource-type", "allocator", "--resource-id", "a1", "--output", "json"])
            .expect("parse");
        assert_eq!(cli.output, Some(Format::Json));
    }

    #[test]
    fn parse_comment_create() {
        let cli = parse(&[
            "comment",
            "create",
            "disk replaced",
            "--resource-type",
            "allocator",
            "--resource-id",
            "192.168.44.10",
        ])
        .expect("parse");

        match cli.command {
            Commands::Comment {
                command: CommentCommands::Create { message, resource },
            } => {
                assert_eq!(message, "disk replaced");
                assert_eq!(resource.resource_type, "allocator");
                assert_eq!(resource.resource_id, "192.168.44.10");
            }
            other => panic!("expected comment create, got {other:?}"),
        }
    }

    #[test_case(&["comment", "create", "msg", "--resource-id", "a1"] ; "create without resource type")]
    #[test_case(&["comment", "list", "--resource-type", "allocator"] ; "list without resource id")]
    #[test_case(&["comment", "show", "--resource-type", "allocator", "--resource-id", "a1"] ; "show without comment id")]
    #[test_case(&["deployment", "extension", "create", "ext", "--type", "bundle"] ; "extension without version")]
    #[test_case(&["deployment", "extension", "update", "id", "--version", "8.*", "--type", "bundle"] ; "extension update without name")]
    #[test_case(&["deployment", "template", "create"] ; "template create without file")]
    #[test_case(&["deployment", "traffic-filter", "create", "--name", "n", "--type", "ip"] ; "ruleset without source")]
    #[test_case(&["deployment", "elasticsearch", "keystore", "set", "d1", "s"] ; "keystore set without value")]
    #[test_case(&["platform", "proxy", "settings", "update"] ; "proxy update without file")]
    fn missing_required_arguments(args: &[&str]) {
        let err = parse(args).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn keystore_value_conflicts_with_file() {
        let err = parse(&[
            "deployment",
            "elasticsearch",
            "keystore",
            "set",
            "d1",
            "s",
            "--value",
            "v",
            "--file",
            "f",
        ])
        .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn extension_download_url_conflicts_with_file() {
        let err = parse(&[
            "deployment",
            "extension",
            "create",
            "ext",
            "--version",
            "8.*",
            "--type",
            "plugin",
            "--download-url",
            "https://example.com/p.zip",
            "--file",
            "p.zip",
        ])
        .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_unknown_extension_type() {
        let err = parse(&["deployment", "extension", "create", "ext", "--version", "8.*", "--type", "theme"])
            .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn parse_traffic_filter_create_with_sources() {
        let cli = parse(&[
            "deployment",
            "traffic-filter",
            "create",
            "--name",
            "office",
            "--type",
            "azure_private_endpoint",
            "--source",
            "10.0.0.0/8",
            "--source",
            "192.168.0.1",
        ])
        .expect("parse");

        match cli.command {
            Commands::Deployment {
                command:
                    DeploymentCommands::TrafficFilter {
                        command:
                            TrafficFilterCommands::Create {
                                ruleset_type,
                                sources,
                                include_by_default,
                                ..
                            },
                    },
            } => {
                assert_eq!(ruleset_type, RulesetTypeArg::AzurePrivateEndpoint);
                assert_eq!(sources, vec!["10.0.0.0/8", "192.168.0.1"]);
                assert!(!include_by_default);
            }
            other => panic!("expected traffic-filter create, got {other:?}"),
        }
    }

    #[test]
    fn association_entity_type_defaults_to_deployment() {
        let cli = parse(&[
            "deployment",
            "traffic-filter",
            "association",
            "create",
            "rs-1",
            "--id",
            "d1",
        ])
        .expect("parse");

        match cli.command {
            Commands::Deployment {
                command:
                    DeploymentCommands::TrafficFilter {
                        command:
                            TrafficFilterCommands::Association {
                                command: AssociationCommands::Create { ruleset_id, entity },
                            },
                    },
            } => {
                assert_eq!(ruleset_id, "rs-1");
                assert_eq!(entity.entity_type, "deployment");
                assert_eq!(entity.entity_id, "d1");
            }
            other => panic!("expected association create, got {other:?}"),
        }
    }

    #[test]
    fn parse_proxy_settings_update() {
        let cli = parse(&[
            "platform", "proxy", "settings", "update", "--file", "s.json", "--version", "3", "--partial",
        ])
        .expect("parse");

        match cli.command {
            Commands::Platform {
                command:
                    PlatformCommands::Proxy {
                        command:
                            ProxyCommands::Settings {
                                command: ProxySettingsCommands::Update { file, version, partial },
                            },
                    },
            } => {
                assert_eq!(file, PathBuf::from("s.json"));
                assert_eq!(version.as_deref(), Some("3"));
                assert!(partial);
            }
            other => panic!("expected proxy settings update, got {other:?}"),
        }
    }

    #[test]
    fn type_args_map_to_api_types() {
        assert_eq!(ExtensionType::from(ExtensionTypeArg::Plugin), ExtensionType::Plugin);
        assert_eq!(
            RulesetType::from(RulesetTypeArg::GcpPrivateServiceConnectEndpoint),
            RulesetType::GcpPrivateServiceConnectEndpoint
        );
    }
}
