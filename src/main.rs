//! courseforge CLI: document-to-course pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use courseforge::engine::ollama::{OllamaClient, OllamaConfig};
use courseforge::engine::ModelError;
use courseforge::ingest;
use courseforge::pipeline::{self, PipelineConfig, PipelineEvent};

#[derive(Parser)]
#[command(name = "courseforge", version, about = "Document-to-course pipeline")]
struct Cli {
    /// Base URL of the Ollama server.
    #[arg(long, global = true, default_value = "http://localhost:11434")]
    ollama_url: String,

    /// Model name to use.
    #[arg(long, global = true, default_value = "llama3.2")]
    model: String,

    /// Model request timeout in seconds.
    #[arg(long, global = true, default_value = "120")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a course from a PDF or text file.
    Generate {
        /// Input file (.pdf or plain text, optionally form-feed paginated).
        input: PathBuf,

        /// Maximum characters per extraction chunk.
        #[arg(long, default_value = "20000")]
        max_chars: usize,

        /// Sections per merge batch.
        #[arg(long, default_value = "20")]
        batch_size: usize,

        /// Write the course JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Preview how an input would be chunked, without any model calls.
    Chunks {
        /// Input file (.pdf or plain text).
        input: PathBuf,

        /// Maximum characters per extraction chunk.
        #[arg(long, default_value = "20000")]
        max_chars: usize,
    },

    /// Analyze table-of-contents text into a book outline.
    Toc {
        /// Text file containing the table of contents.
        input: PathBuf,

        /// Write the outline JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            max_chars,
            batch_size,
            output,
        } => {
            let pages = ingest::pages_from_file(&input).into_diagnostic()?;
            let mut engine = connect(&cli.ollama_url, &cli.model, cli.timeout_secs)?;

            let config = PipelineConfig {
                max_chars,
                batch_size,
            };
            let course = pipeline::generate_course_with_observer(
                &pages,
                &mut engine,
                &config,
                print_progress,
            )
            .into_diagnostic()?;

            write_json(&course, output.as_deref())?;
        }

        Commands::Chunks { input, max_chars } => {
            let pages = ingest::pages_from_file(&input).into_diagnostic()?;
            let chunks = pipeline::chunker::chunk_pages(&pages, max_chars).into_diagnostic()?;

            println!("{} pages -> {} chunks", pages.len(), chunks.len());
            for (i, chunk) in chunks.iter().enumerate() {
                println!(
                    "  chunk {:>3}: pages {}-{}, {} chars",
                    i + 1,
                    chunk.start_page,
                    chunk.end_page,
                    chunk.text.chars().count()
                );
            }
        }

        Commands::Toc { input, output } => {
            let toc_text = std::fs::read_to_string(&input).into_diagnostic()?;
            let mut engine = connect(&cli.ollama_url, &cli.model, cli.timeout_secs)?;

            let outline = pipeline::toc::analyze_toc(&toc_text, &mut engine).into_diagnostic()?;
            write_json(&outline, output.as_deref())?;
        }
    }

    Ok(())
}

/// Connect to Ollama, failing with a diagnostic if it is unreachable.
fn connect(base_url: &str, model: &str, timeout_secs: u64) -> Result<OllamaClient> {
    let mut engine = OllamaClient::new(OllamaConfig {
        base_url: base_url.into(),
        model: model.into(),
        timeout_secs,
    });
    if !engine.probe() {
        return Err(ModelError::Unavailable {
            url: base_url.into(),
        })
        .into_diagnostic();
    }
    Ok(engine)
}

fn print_progress(event: PipelineEvent) {
    match event {
        PipelineEvent::ChunkExtracted {
            index,
            total,
            sections,
        } => {
            println!("chunk {}/{}: {} sections extracted", index + 1, total, sections);
        }
        PipelineEvent::BatchMerged {
            index,
            total,
            modules,
            fallback,
        } => {
            let note = if fallback { " (fallback)" } else { "" };
            println!("batch {}/{}: {} modules{note}", index + 1, total, modules);
        }
    }
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&std::path::Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    match output {
        Some(path) => {
            std::fs::write(path, json).into_diagnostic()?;
            println!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
