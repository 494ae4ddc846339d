use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use std::fs;
use std::path::PathBuf;

use crate::conditions::{OpKind, Root};
use crate::config::{self, Config};
use crate::engine::Engine;
use crate::i18n::Language;

use super::exit_codes;
use super::output::{self, OutputMode, TagData};

#[derive(Parser)]
#[command(name = "jbdap")]
#[command(about = "Evaluate JBDAP conditions, references and field projections over JSON data")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides JBDAP_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Language of error messages (overrides settings.language)
    #[arg(long, global = true, value_enum)]
    pub lang: Option<Language>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log engine internals to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// every JSON argument is either inline JSON or `@path` to a JSON file
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a condition object to true or false
    Check {
        /// Condition object, e.g. '{"age#gte": 18}'
        #[arg(short, long)]
        condition: String,

        /// Operator vocabulary: compare (onlyIf) or query (where)
        #[arg(long, value_enum, default_value_t = OpKind::Compare)]
        kind: OpKind,

        /// Relation between the top level items: and, or, not
        #[arg(long, default_value = "and")]
        relation: String,

        /// Fetched entities, e.g. '{"User": {"data": {...}}}'
        #[arg(long)]
        root: Option<String>,

        /// Parent record addressed by `$` tags
        #[arg(long)]
        parent: Option<String>,

        /// Record whose properties bare names address
        #[arg(long = "self", value_name = "SELF")]
        current: Option<String>,
    },

    /// Resolve a single tag against the data context
    Tag {
        /// Tag such as '/User.name', '$.id', 'age' or a plain literal
        tag: String,

        /// Fetched entities, e.g. '{"User": {"data": {...}}}'
        #[arg(long)]
        root: Option<String>,

        /// Parent record addressed by `$` tags
        #[arg(long)]
        parent: Option<String>,

        /// Record whose properties bare names address
        #[arg(long = "self", value_name = "SELF")]
        current: Option<String>,
    },

    /// Pick one record from a list (or project a single record)
    Entity {
        /// Record list or single record
        #[arg(short, long)]
        records: String,

        /// Query object with `where` and `order`
        #[arg(long)]
        query: Option<String>,

        /// Field expression, e.g. 'id,name=>title' (default '*')
        #[arg(short, long)]
        fields: Option<String>,

        /// Fetched entities, e.g. '{"User": {"data": {...}}}'
        #[arg(long)]
        root: Option<String>,

        /// Parent record addressed by `$` tags
        #[arg(long)]
        parent: Option<String>,
    },

    /// Filter, sort, page and project a record list
    List {
        /// Record list
        #[arg(short, long)]
        records: String,

        /// Query object with `where`, `order`, `page` and `size`
        #[arg(long)]
        query: Option<String>,

        /// Field expression, e.g. 'id,name=>title' (default '*')
        #[arg(short, long)]
        fields: Option<String>,

        /// Fetched entities, e.g. '{"User": {"data": {...}}}'
        #[arg(long)]
        root: Option<String>,

        /// Parent record addressed by `$` tags
        #[arg(long)]
        parent: Option<String>,
    },

    /// Compute aggregate values over a record list
    Values {
        /// Record list
        #[arg(short, long)]
        records: String,

        /// Values expression, e.g. 'count#id=>total,sum#score=>points'
        #[arg(short, long)]
        fields: String,
    },

    /// Show how a field expression is parsed
    ParseFields {
        /// Field expression (string shorthand or JSON array)
        fields: String,
    },

    /// Show how an order expression is parsed
    ParseOrder {
        /// Order expression, e.g. 'age#desc,name'
        order: String,
    },

    /// Compute offset and limit from page and size
    Page {
        /// Page number, starting at 1 (needs --size)
        #[arg(long)]
        page: Option<String>,

        /// Page size, 0 for unbounded
        #[arg(long)]
        size: Option<String>,
    },

    /// Check the property rules of a command object
    CheckCommand {
        /// Command object, e.g. '{"type": "list", "fields": "*"}'
        command: String,

        /// Apply the extra rules of top level commands
        #[arg(long)]
        top: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Show the default configuration
    Default,
    /// Verify configuration file for errors
    Verify,
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = config::get_config_path(cli.config.as_deref())?;
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    // config subcommands must work on a broken config file
    let engine = match (&cli.command, cli.lang) {
        (Commands::Config { .. }, _) => Engine::default(),
        (_, Some(lang)) => Engine::with_language(lang),
        (_, None) => Engine::new(&config::load(&config_path)?.settings),
    };
    debug!(lang = %engine.language(), "engine ready");

    match cli.command {
        Commands::Check {
            condition,
            kind,
            relation,
            root,
            parent,
            current,
        } => {
            let condition = read_json(&condition)?;
            let root = read_root(root.as_deref())?;
            let parent = read_optional(parent.as_deref())?;
            let current = read_optional(current.as_deref())?;

            let outcome = engine.check_condition(
                kind,
                &condition,
                &relation,
                &root,
                parent.as_ref(),
                current.as_ref(),
            );
            finish(output_mode, outcome)
        }

        Commands::Tag {
            tag,
            root,
            parent,
            current,
        } => {
            let root = read_root(root.as_deref())?;
            let parent = read_optional(parent.as_deref())?;
            let current = read_optional(current.as_deref())?;

            let outcome = engine
                .tag_to_value(&tag, &root, parent.as_ref(), current.as_ref())
                .map(TagData::from);
            finish(output_mode, outcome)
        }

        Commands::Entity {
            records,
            query,
            fields,
            root,
            parent,
        } => {
            let records = read_json(&records)?;
            let query = read_optional(query.as_deref())?;
            let fields = read_optional_or_string(fields.as_deref())?;
            let root = read_root(root.as_deref())?;
            let parent = read_optional(parent.as_deref())?;

            let outcome = engine.parse_fields(fields.as_ref()).and_then(|spec| match &records {
                Value::Array(list) => {
                    engine.get_obj_from_list(list, query.as_ref(), &spec.raw, &root, parent.as_ref())
                }
                Value::Null => Ok(Value::Null),
                record => engine.get_obj_from_obj(record, &spec.raw),
            });
            finish(output_mode, outcome)
        }

        Commands::List {
            records,
            query,
            fields,
            root,
            parent,
        } => {
            let records = read_records(&records)?;
            let query = read_optional(query.as_deref())?;
            let fields = read_optional_or_string(fields.as_deref())?;
            let root = read_root(root.as_deref())?;
            let parent = read_optional(parent.as_deref())?;

            let outcome = engine.parse_fields(fields.as_ref()).and_then(|spec| {
                engine.get_list_from_list(&records, query.as_ref(), &spec.raw, &root, parent.as_ref())
            });
            finish(output_mode, outcome)
        }

        Commands::Values { records, fields } => {
            let records = read_records(&records)?;
            let fields = read_json_or_string(&fields)?;

            let outcome = engine
                .parse_fields(Some(&fields))
                .and_then(|spec| engine.get_values_from_list(&records, &spec.values));
            finish(output_mode, outcome)
        }

        Commands::ParseFields { fields } => {
            let fields = read_json_or_string(&fields)?;
            finish(output_mode, engine.parse_fields(Some(&fields)))
        }

        Commands::ParseOrder { order } => {
            let order = read_json_or_string(&order)?;
            finish(output_mode, engine.parse_order(Some(&order)))
        }

        Commands::Page { page, size } => {
            let page = read_optional_or_string(page.as_deref())?;
            let size = read_optional_or_string(size.as_deref())?;
            finish(
                output_mode,
                engine.parse_offset_and_limit(page.as_ref(), size.as_ref()),
            )
        }

        Commands::CheckCommand { command, top } => {
            let command = read_json(&command)?;
            let outcome = if top {
                engine.check_top_command(&command)
            } else {
                engine.check_command(&command)
            };
            finish(output_mode, outcome)
        }

        Commands::Config { command } => execute_config(&command, &config_path),
    }
}

fn execute_config(command: &ConfigCommands, path: &std::path::Path) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = config::load(path)?;
            let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{}", json);
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Default => {
            let json = serde_json::to_string_pretty(&Config::default())
                .context("Failed to serialize config")?;
            println!("{}", json);
            Ok(())
        }
        ConfigCommands::Verify => {
            let errors = match config::verify(path) {
                Ok(errors) => errors,
                Err(e) => {
                    eprintln!("✗ {}", e);
                    std::process::exit(exit_codes::CONFIG_ERROR);
                }
            };

            if errors.is_empty() {
                println!("✓ Configuration is valid: {}", path.display());
                Ok(())
            } else {
                println!(
                    "✗ Configuration has {} error(s): {}",
                    errors.len(),
                    path.display()
                );
                println!();
                for error in &errors {
                    println!("  - {}", error);
                }
                std::process::exit(exit_codes::CONFIG_ERROR);
            }
        }
    }
}

/// print the result, or report the engine error and exit with its code
fn finish<T: Serialize>(mode: OutputMode, outcome: crate::error::Result<T>) -> Result<()> {
    match outcome {
        Ok(data) => {
            output::print_result(mode, &data);
            Ok(())
        }
        Err(err) => {
            debug!(kind = %err.root_kind(), "engine error");
            if mode.is_json() {
                output::print_engine_error(&err);
            } else {
                eprintln!("{}", output::format_engine_error(&err));
            }
            std::process::exit(exit_codes::for_error(&err));
        }
    }
}

/// inline JSON or `@path` to a JSON file
fn read_json(arg: &str) -> Result<Value> {
    if let Some(path) = arg.strip_prefix('@') {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {}", path));
    }
    serde_json::from_str(arg).with_context(|| format!("Invalid JSON argument: {}", arg))
}

/// like [`read_json`] but a bare word is taken as a JSON string
fn read_json_or_string(arg: &str) -> Result<Value> {
    if arg.starts_with('@') {
        return read_json(arg);
    }
    Ok(serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string())))
}

fn read_optional(arg: Option<&str>) -> Result<Option<Value>> {
    arg.map(read_json).transpose()
}

fn read_optional_or_string(arg: Option<&str>) -> Result<Option<Value>> {
    arg.map(read_json_or_string).transpose()
}

fn read_records(arg: &str) -> Result<Vec<Value>> {
    match read_json(arg)? {
        Value::Array(records) => Ok(records),
        Value::Null => Ok(Vec::new()),
        other => bail!("Records must be a JSON array, got: {}", other),
    }
}

fn read_root(arg: Option<&str>) -> Result<Root> {
    let Some(arg) = arg else {
        return Ok(Root::new());
    };
    let value = read_json(arg)?;
    if !value.is_object() {
        return Err(anyhow!("Root must be an object of entity name to {{\"data\": ...}}"));
    }
    serde_json::from_value(value).context("Invalid root entities")
}
