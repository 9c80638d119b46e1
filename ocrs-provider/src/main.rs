//! `ocrs-parse`: extracts a validated OCRS/1.0 recipe from a text file.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ocrs_parser::prelude::*;
use ocrs_parser::schema::ocrs_schema;
use ocrs_provider::config::DEFAULT_MODEL;
use ocrs_provider::{ProviderConfig, RigExtractor};
use rig::client::{CompletionClient, ProviderClient};
use rig::providers::openai;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recipe text file ("-" reads stdin)
    input: PathBuf,

    /// File holding the extraction instructions sent as the system prompt
    #[arg(long)]
    prompt: PathBuf,

    /// JSON-schema file for the output shape (default: embedded OCRS/1.0 schema)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Retries after the first attempt
    #[arg(long, default_value_t = 2)]
    max_retries: usize,

    /// Sampling seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let text = read_input(&cli.input)?;
    let system_prompt = std::fs::read_to_string(&cli.prompt)
        .with_context(|| format!("reading prompt {}", cli.prompt.display()))?;
    let schema = match &cli.schema {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading schema {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing schema {}", path.display()))?
        }
        None => ocrs_schema()?,
    };

    let config = ProviderConfig::default()
        .with_model(cli.model.as_str())
        .with_seed(cli.seed);

    // Chat Completions carries `response_format` and `seed` through additional params.
    let client = openai::Client::from_env();
    let model = client.completion_model(&cli.model).completions_api();
    let node = SchemaNode::from_value(&schema);
    let provider = RigExtractor::new(model, system_prompt, &node, config);

    let validator = StructuralValidator::new(&schema)?;
    let pipeline = Pipeline::new(provider)?
        .with_validator(validator.into())
        .with_config(ExtractionConfig::default().with_max_retries(cli.max_retries));

    let result = pipeline.run(&text).await.context("invalid input")?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading recipe from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading recipe {}", path.display()))
}
