use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docxlate_core::translate::{is_supported_target, SUPPORTED_TARGETS};
use docxlate_core::{DocumentTranslator, Glossary, TranslatorSettings, WmlDocument};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "docxlate")]
#[command(about = "Layout-preserving DOCX translation with glossary styling", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct Cli {
    /// Term forms per language (term -> language -> [forms])
    #[arg(long, global = true, env = "DOCXLATE_TERMS", default_value = "terms.json")]
    terms: PathBuf,

    /// Reference links per language (language -> term -> URL)
    #[arg(long, global = true, env = "DOCXLATE_LINKS", default_value = "links.json")]
    links: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a document
    Translate {
        input: PathBuf,

        #[arg(short, long)]
        lang: String,

        /// Defaults to <stem>_<LANG>_<timestamp>.docx next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 50)]
        batch_size: usize,

        /// Print the job result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Translate a single string
    Text {
        text: String,

        #[arg(short, long)]
        lang: String,
    },
    /// Show provider character usage
    Usage,
    /// Show paragraph and relationship counts of a document
    Info {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: could not load .env: {}", e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Translate {
            input,
            lang,
            output,
            batch_size,
            json,
        } => {
            warn_if_unsupported(&lang);
            let glossary = Arc::new(Glossary::load(&cli.terms, &cli.links)?);
            let settings = TranslatorSettings::default().with_batch_size(batch_size);
            let translator = DocumentTranslator::from_env(glossary, settings)?;

            let output = output.unwrap_or_else(|| default_output_path(&input, &lang));
            let outcome = translator.translate(&input, &output, &lang);

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            if !outcome.success {
                bail!(outcome.reason.unwrap_or_else(|| "translation failed".to_string()));
            }
            if !json {
                println!("Translated document written to {}", output.display());
                if let Some(report) = outcome.report {
                    println!("  Paragraphs:  {} of {}", report.paragraphs_translated, report.paragraphs_seen);
                    println!("  Batches:     {}", report.batches);
                    println!("  Styled:      {}", report.styled_paragraphs);
                    println!("  Hyperlinks:  {}", report.hyperlinks_added);
                }
            }
        }
        Commands::Text { text, lang } => {
            warn_if_unsupported(&lang);
            let glossary = Arc::new(Glossary::empty());
            let translator = DocumentTranslator::from_env(glossary, TranslatorSettings::default())?;
            println!("{}", translator.translate_text(&text, &lang)?);
        }
        Commands::Usage => {
            let translator =
                DocumentTranslator::from_env(Arc::new(Glossary::empty()), TranslatorSettings::default())?;
            let usage = translator.usage().context("usage query failed")?;
            println!(
                "Characters used: {} of {} ({} remaining)",
                usage.character_count,
                usage.character_limit,
                usage.remaining()
            );
        }
        Commands::Info { file, json } => {
            let document = WmlDocument::open(&file)
                .with_context(|| format!("cannot open {}", file.display()))?;
            let summary = document.summary()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Document info for: {}", file.display());
                println!("  Main part:               {}", document.main_part_name());
                println!("  Paragraphs:              {}", summary.paragraphs);
                println!("  Translatable paragraphs: {}", summary.translatable_paragraphs);
                println!("  Relationships:           {}", summary.relationships);
            }
        }
    }
    Ok(())
}

fn warn_if_unsupported(lang: &str) {
    if !is_supported_target(lang) {
        warn!(
            "'{}' is not a supported target (supported: {}); passing it to the provider as is",
            lang,
            SUPPORTED_TARGETS.join(", ")
        );
    }
}

fn default_output_path(input: &Path, lang: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let name = format!(
        "{}_{}_{}.docx",
        stem,
        lang.to_uppercase(),
        chrono::Utc::now().timestamp()
    );
    input.with_file_name(name)
}
