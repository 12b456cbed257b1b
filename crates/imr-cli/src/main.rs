use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::info;

use imr_core::flatten::{FlattenOptions, flatten_with_options};
use imr_core::overrides;
use imr_core::parse;
use imr_core::parse::spec::SwaggerSpec;

#[derive(Parser)]
#[command(name = "imr", about = "Swagger 2.0 inline model resolver", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lift inline models out of a Swagger spec
    Flatten {
        /// Path to the Swagger spec file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the normalized spec (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML file mapping titles to schema selectors
        #[arg(long)]
        titles: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Validate that a Swagger spec parses
    Validate {
        /// Path to the Swagger spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Flatten {
            input,
            output,
            titles,
            format,
        } => cmd_flatten(input, output, titles, format),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "imr", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn cmd_flatten(
    input: PathBuf,
    output: Option<PathBuf>,
    titles: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut spec = load_spec(&input)?;

    // The override table is loaded up front; a missing or unparsable file
    // aborts before any of the document is touched.
    let mut options = FlattenOptions::default();
    if let Some(titles) = titles {
        options.title_overrides = Some(overrides::load_overrides(&titles)?);
    }

    flatten_with_options(&mut spec, &options)?;
    info!("flattened {} definitions", spec.definitions.len());

    let rendered = match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(&spec)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&spec)?;
            json.push('\n');
            json
        }
    };

    match output {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  wrote {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let spec = load_spec(&input)?;
    eprintln!(
        "  ok: {} paths, {} definitions",
        spec.paths.len(),
        spec.definitions.len()
    );
    Ok(())
}

fn load_spec(path: &Path) -> Result<SwaggerSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let spec = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    Ok(spec)
}
