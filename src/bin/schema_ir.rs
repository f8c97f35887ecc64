//! Schema IR CLI
//!
//! Resolves a raw spec document and prints the intermediate model, its
//! recursive type groups, or its fingerprint.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_ir::{render, Engine, Fingerprint, IrConfig, RawSpec, ReferenceGraph, Spec};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-ir")]
#[command(about = "Resolve raw API schemas into a named, cycle-safe intermediate model")]
struct Cli {
    /// Config file (defaults to schema-ir.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a raw spec and print the IR as JSON
    Resolve {
        /// Raw spec JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Compact JSON instead of pretty
        #[arg(long)]
        compact: bool,
    },

    /// List recursive schema groups
    Cycles {
        #[arg(short, long)]
        input: PathBuf,
        /// Also write the reference graph as DOT
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Print the fingerprint of the resolved IR
    Fingerprint {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.config.as_deref().and_then(Path::to_str) {
        Some(path) => IrConfig::load_from(Some(path)),
        None => IrConfig::load(),
    }
    .context("loading configuration")?;
    let engine = Engine::new(config);

    match cli.command {
        Commands::Resolve {
            input,
            output,
            compact,
        } => {
            let spec = resolve(&engine, &input)?;
            let content = if compact {
                render::to_value(&spec).to_string()
            } else {
                render::to_string_pretty(&spec)?
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("✅ Wrote IR for {} schemas to {:?}", spec.schemas.len(), path);
                }
                None => println!("{}", content),
            }
        }

        Commands::Cycles { input, dot } => {
            let spec = resolve(&engine, &input)?;
            let graph = ReferenceGraph::build(&spec);
            let groups = graph.recursive_groups();
            println!(
                "{} schemas, {} references, {} recursive groups",
                graph.schema_count(),
                graph.edge_count(),
                groups.len()
            );
            for group in &groups {
                println!("  🔁 {}", group.join(" -> "));
            }
            if let Some(path) = dot {
                std::fs::write(&path, graph.to_dot())
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("✅ Exported DOT to: {:?}", path);
            }
        }

        Commands::Fingerprint { input } => {
            let spec = resolve(&engine, &input)?;
            println!("{}", Fingerprint::of(&spec));
        }
    }

    Ok(())
}

fn resolve(engine: &Engine, input: &Path) -> anyhow::Result<Spec> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let raw = RawSpec::from_json(&content).with_context(|| format!("decoding {}", input.display()))?;
    let spec = engine
        .run(&raw)
        .with_context(|| format!("resolving {}", input.display()))?;
    Ok(spec)
}
