use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use restgen::GeneratorOptions;
use restgen::output::{self, Outcome};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Generate HTTP request builders from annotated Rust traits
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(after_help = "USAGE OF GENERATED FILES:
    Each input `photos.rs` yields `photos_restgen.rs`, which has no `use` lines.
    Add `include!(\"photos_restgen.rs\");` to the module declaring the traits,
    with the `@SYNC` result types in scope there.

ENVIRONMENT:
    RUST_LOG=debug    Enable debug logging")]
struct Cli {
    /// Rust source files, or directories to search for them
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write generated files here instead of next to their inputs
    #[arg(short = 'o', long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Path of the runtime module generated code refers to
    #[arg(long, default_value = "::restgen::restclient")]
    runtime: String,

    /// Write nothing; fail if a generated file is missing or out of date
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    // warnings about unbound placeholders are shown unless RUST_LOG says otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let options = GeneratorOptions::with_runtime(&cli.runtime)
        .with_context(|| format!("Invalid runtime path `{}`", cli.runtime))?;

    let inputs = output::collect_inputs(&cli.inputs).context("Failed to collect input files")?;
    debug!(count = inputs.len(), "collected inputs");

    let mut stale = Vec::new();
    for input in &inputs {
        let outcome = output::process_file(input, cli.out_dir.as_deref(), &options, cli.check)
            .with_context(|| format!("Failed to generate builders for {}", input.display()))?;
        match outcome {
            Outcome::Written(path) => println!("generated {}", path.display()),
            Outcome::Unchanged(path) => debug!(output = %path.display(), "up to date"),
            Outcome::Skipped => {}
            Outcome::Stale(path) => stale.push(path),
        }
    }

    if !stale.is_empty() {
        for path in &stale {
            eprintln!("out of date: {}", path.display());
        }
        bail!("{} generated file(s) out of date", stale.len());
    }
    Ok(())
}
