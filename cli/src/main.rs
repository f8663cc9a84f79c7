use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::ASCII_FULL, Table};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use stepforge_core::{
    sanitize_input, sanitize_selector, validate_assertion, validate_file_path, validate_json,
    validate_number, validate_script_name, validate_selector, validate_step_name, validate_text,
    validate_timeout, validate_url, validate_variable_name, AssertionKind, BatchValidation,
    Framework, NumberRules, Platform, Script, ScriptResult, StepCatalog, StepType,
    StepforgeConfig, TextRules, ValidationResult,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Stepforge test script validation toolkit")]
struct StepforgeCli {
    /// Settings file (YAML or JSON) overriding validation limits
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a script document and list every problem found
    Validate {
        /// Path to the script document (.json, .yaml or .yml)
        input: PathBuf,
        /// Output JSON instead of a human-readable listing
        #[arg(long)]
        json: bool,
    },
    /// Browse or export the step catalog
    Catalog {
        /// Restrict the listing to one platform
        #[arg(long)]
        platform: Option<Platform>,
        /// Show the parameter schema of one step kind
        #[arg(long)]
        kind: Option<StepType>,
        /// Output format
        #[arg(long, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Write an empty script document
    New {
        #[arg(long)]
        platform: Platform,
        /// Defaults to the platform's first framework
        #[arg(long)]
        framework: Option<Framework>,
        #[arg(long, default_value = "")]
        name: String,
        /// Write to a file instead of stdout; the extension picks the format
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check a single value with one of the field validators
    Check {
        #[arg(value_enum)]
        validator: Validator,
        value: String,
        /// Output JSON instead of a one-line verdict
        #[arg(long)]
        json: bool,
    },
    /// Print the sanitized form of a value
    Sanitize {
        #[arg(value_enum)]
        mode: SanitizeMode,
        value: String,
    },
    /// Convert a script document between JSON and YAML
    Convert {
        input: PathBuf,
        output: PathBuf,
    },
    /// Summarize an execution result document
    Report {
        input: PathBuf,
        /// Output JSON instead of a human-readable summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Validator {
    Selector,
    Url,
    Text,
    Number,
    Json,
    Regex,
    Jsonpath,
    Numeric,
    FilePath,
    Variable,
    StepName,
    ScriptName,
    Timeout,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SanitizeMode {
    Input,
    Selector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = StepforgeCli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Validate { input, json } => {
            let script = load_script(&input)?;
            let result = script.validate_with(&config.validation);
            output_validation(&script, &result, json)?;
            if !result.valid {
                anyhow::bail!("validation failed");
            }
        }
        Command::Catalog {
            platform,
            kind,
            format,
        } => {
            output_catalog(platform, kind, format)?;
        }
        Command::New {
            platform,
            framework,
            name,
            output,
        } => {
            let framework = framework.unwrap_or_else(|| platform.default_framework());
            if !platform.supports(framework) {
                anyhow::bail!("framework '{framework}' is not available for platform '{platform}'");
            }
            let mut script = Script::create_empty(platform, framework);
            script.name = name;
            match output {
                Some(path) => {
                    write_script(&script, &path)?;
                    tracing::info!(path = %path.display(), "script written");
                }
                None => println!("{}", render_script(&script, DocumentFormat::Json)?),
            }
        }
        Command::Check {
            validator,
            value,
            json,
        } => {
            let result = run_validator(validator, &value);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{result}");
            }
            if !result.valid {
                anyhow::bail!("validation failed");
            }
        }
        Command::Sanitize { mode, value } => {
            let sanitized = match mode {
                SanitizeMode::Input => sanitize_input(&value),
                SanitizeMode::Selector => sanitize_selector(&value),
            };
            println!("{sanitized}");
        }
        Command::Convert { input, output } => {
            let script = load_script(&input)?;
            write_script(&script, &output)?;
            tracing::info!(from = %input.display(), to = %output.display(), "script converted");
        }
        Command::Report { input, json } => {
            let content = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let result: ScriptResult = match DocumentFormat::from_path(&input) {
                DocumentFormat::Yaml => serde_yaml::from_str(&content)?,
                DocumentFormat::Json => serde_json::from_str(&content)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&result.summary)?);
            } else {
                print!("{result}");
            }
            if result.has_failures() {
                tracing::warn!(failed = result.summary.failed, "execution had failures");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StepforgeConfig> {
    let Some(path) = path else {
        return Ok(StepforgeConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    // YAML is a superset of JSON, one parser covers both.
    let config = serde_yaml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn load_script(path: &Path) -> anyhow::Result<Script> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let script = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid script document {}", path.display()))?,
        DocumentFormat::Json => Script::from_json(&content)
            .with_context(|| format!("failed to load {}", path.display()))?,
    };
    Ok(script)
}

fn render_script(script: &Script, format: DocumentFormat) -> anyhow::Result<String> {
    Ok(match format {
        DocumentFormat::Json => script.to_json_pretty()?,
        DocumentFormat::Yaml => serde_yaml::to_string(script)?,
    })
}

fn write_script(script: &Script, path: &Path) -> anyhow::Result<()> {
    let rendered = render_script(script, DocumentFormat::from_path(path))?;
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}

fn output_validation(script: &Script, result: &BatchValidation, json: bool) -> anyhow::Result<()> {
    if json {
        let payload = json!({
            "script": script.name,
            "platform": script.platform,
            "framework": script.framework,
            "steps": script.steps.len(),
            "valid": result.valid,
            "errors": result.errors,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if !result.errors.is_empty() {
        println!("Diagnostics:");
        for (field, message) in &result.errors {
            println!("  - [error] {field}: {message}");
        }
        println!();
    }

    println!(
        "Script '{}' ({} / {}): {} steps, {}",
        script.name,
        script.platform.label(),
        script.framework.label(),
        script.steps.len(),
        if result.valid { "valid" } else { "invalid" }
    );
    Ok(())
}

fn run_validator(validator: Validator, value: &str) -> ValidationResult {
    // Numbers and assertion values may arrive as JSON literals.
    let literal = || serde_json::from_str::<Value>(value).unwrap_or_else(|_| json!(value));
    match validator {
        Validator::Selector => validate_selector(value),
        Validator::Url => validate_url(value),
        Validator::Text => validate_text(value, &TextRules::default()),
        Validator::Number => validate_number(&literal(), &NumberRules::new("number")),
        Validator::Json => validate_json(value),
        Validator::Regex => validate_assertion(&json!(value), AssertionKind::Regex),
        Validator::Jsonpath => validate_assertion(&json!(value), AssertionKind::Jsonpath),
        Validator::Numeric => validate_assertion(&literal(), AssertionKind::Numeric),
        Validator::FilePath => validate_file_path(value),
        Validator::Variable => validate_variable_name(value),
        Validator::StepName => validate_step_name(value),
        Validator::ScriptName => validate_script_name(value),
        Validator::Timeout => validate_timeout(&literal()),
    }
}

#[derive(Debug)]
struct KindListing {
    kind: StepType,
    category: &'static str,
    label: &'static str,
    platform: Platform,
}

fn kind_listings(platforms: &[Platform]) -> Vec<KindListing> {
    let catalog = StepCatalog::global();
    let mut listings = Vec::new();
    for platform in platforms {
        for category in catalog.categories(*platform) {
            for definition in &category.steps {
                listings.push(KindListing {
                    kind: definition.kind,
                    category: category.name,
                    label: definition.label,
                    platform: *platform,
                });
            }
        }
    }
    listings
}

fn output_catalog(
    platform: Option<Platform>,
    kind: Option<StepType>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let catalog = StepCatalog::global();
    let platforms: Vec<Platform> = match platform {
        Some(platform) => vec![platform],
        None => Platform::ALL.to_vec(),
    };

    if let Some(kind) = kind {
        let definitions: Vec<_> = platforms
            .iter()
            .filter_map(|platform| {
                catalog
                    .definition(kind, *platform)
                    .map(|definition| (*platform, definition))
            })
            .collect();
        if definitions.is_empty() {
            anyhow::bail!("step kind '{kind}' is not available on the selected platforms");
        }
        let payload = || -> Vec<Value> {
            definitions
                .iter()
                .map(|(platform, definition)| {
                    json!({ "platform": platform, "definition": definition })
                })
                .collect()
        };
        return match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&payload())?);
                Ok(())
            }
            OutputFormat::Yaml => {
                print!("{}", serde_yaml::to_string(&payload())?);
                Ok(())
            }
            OutputFormat::Table => {
                for (platform, definition) in &definitions {
                    println!("{} on {platform}: {}", definition.label, definition.description);
                    let mut table = Table::new();
                    table.load_preset(ASCII_FULL);
                    table.set_header(vec!["Param", "Label", "Kind", "Required", "Default"]);
                    for schema in &definition.param_schema {
                        let kind = serde_json::to_value(schema.kind)?;
                        let default = definition
                            .default_params
                            .get(schema.name)
                            .or(schema.default.as_ref())
                            .map(Value::to_string)
                            .unwrap_or_default();
                        table.add_row(vec![
                            schema.name.to_string(),
                            schema.label.to_string(),
                            kind.as_str().unwrap_or_default().to_string(),
                            if schema.required { "yes" } else { "" }.to_string(),
                            default,
                        ]);
                    }
                    println!("{table}\n");
                }
                Ok(())
            }
        };
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let mut bundle = catalog.bundle();
            bundle
                .platforms
                .retain(|candidate, _| platforms.contains(candidate));
            if matches!(format, OutputFormat::Json) {
                println!("{}", serde_json::to_string_pretty(&bundle)?);
            } else {
                print!("{}", serde_yaml::to_string(&bundle)?);
            }
        }
        OutputFormat::Table => {
            let listings = kind_listings(&platforms);
            let mut table = Table::new();
            table.load_preset(ASCII_FULL);
            table.set_header(vec!["Platform", "Category", "Kind", "Label"]);
            for listing in &listings {
                table.add_row(vec![
                    listing.platform.to_string(),
                    listing.category.to_string(),
                    listing.kind.to_string(),
                    listing.label.to_string(),
                ]);
            }
            println!("{table}");
            println!("{} step kinds", listings.len());
        }
    }

    Ok(())
}
