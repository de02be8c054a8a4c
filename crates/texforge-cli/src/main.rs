use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use texforge_build::{BuildRecord, CompileJob, Engine, ShellEngine};
use texforge_core::config::DocumentConfig;
use texforge_core::diagnostics::Diagnostics;
use texforge_core::Document;

#[derive(Parser)]
#[command(name = "texforge")]
#[command(about = "Assemble and compile LaTeX documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assembled LaTeX source
    Render {
        /// Document defaults (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// LaTeX body lines to place inside the document environment
        #[arg(long, value_name = "FILE")]
        body: Option<PathBuf>,
        /// Start from the KOMA preset instead of an empty document
        #[arg(long)]
        standard: bool,
    },
    /// Report incompatible packages
    Check {
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
        /// Print the findings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the source and run the configured TeX engine
    Compile {
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        body: PathBuf,
        #[arg(long)]
        standard: bool,
        /// Compile even if the source did not change
        #[arg(long)]
        force: bool,
    },
}

fn load_document(config: Option<&Path>, body: Option<&Path>, standard: bool) -> anyhow::Result<Document> {
    let mut document = if standard {
        Document::standard()
    } else {
        Document::new()
    };
    if let Some(path) = config {
        let config = DocumentConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        config.apply(&mut document)?;
    }
    if let Some(path) = body {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read body {}", path.display()))?;
        for line in content.lines() {
            document.line(line);
        }
    }
    Ok(document)
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Render {
            config,
            body,
            standard,
        } => {
            let document = load_document(config.as_deref(), body.as_deref(), *standard)?;
            let rendered = document.render();
            print_diagnostics(&rendered.diagnostics);
            print!("{}", rendered.source);
        }
        Commands::Check { config, json } => {
            let document = load_document(Some(config.as_path()), None, false)?;
            let mut diagnostics = Diagnostics::new();
            let incompatible = document.check_packages(&mut diagnostics);
            if *json {
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
            } else {
                print_diagnostics(&diagnostics);
            }
            if incompatible {
                bail!("{} package conflict(s) found", diagnostics.len());
            }
        }
        Commands::Compile {
            config,
            body,
            standard,
            force,
        } => {
            let document = load_document(config.as_deref(), Some(body.as_path()), *standard)?;
            print_diagnostics(document.diagnostics());

            let engine = ShellEngine::for_document(&document);
            if !engine.is_available() {
                bail!("{} was not found on PATH", engine.name());
            }
            let job = CompileJob::from_document(&document);
            let record_path = job.output_dir.join(texforge_build::record::RECORD_FILENAME);
            let mut record = BuildRecord::load_or_default(&record_path)?;
            if *force {
                record.entries.clear();
            }

            match record.compile_if_changed(&engine, &job)? {
                None => info!("nothing to do"),
                Some(0) => {
                    record.save(&record_path)?;
                    println!("{}", job.pdf_path().display());
                }
                Some(status) => bail!("{} exited with status {}", engine.name(), status),
            }
        }
    }
    Ok(())
}
