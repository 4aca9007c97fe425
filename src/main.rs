//! Shabdkosh - Multilingual Indic Dictionary
//!
//! Command-line entry point: dictionary lookups with live translation into the
//! 22 scheduled languages of India, plus dictionary maintenance commands.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use shabdkosh::batch::BatchResult;
use shabdkosh::cli::{Args, Commands};
use shabdkosh::config::{Config, StoreBackend};
use shabdkosh::error::ShabdkoshError;
use shabdkosh::language::Language;
use shabdkosh::record::{Translations, WordRecord};
use shabdkosh::workflow::{SearchOptions, SearchOutcome, Workflow};

const DEFAULT_CONFIG_FILE: &str = "shabdkosh.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Commands that need neither providers nor the dictionary
    match &args.command {
        Commands::InitConfig { output } => {
            Config::default().save_to_file(output)?;
            println!("Wrote default configuration to {}", output.display());
            return Ok(());
        }
        Commands::Languages => {
            print_languages();
            return Ok(());
        }
        _ => {}
    }

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env();
    if args.ephemeral {
        config.store.backend = StoreBackend::Memory;
    }
    config.validate()?;

    let threshold = (config.persistence.min_accepted, config.persistence.out_of);
    let workflow = Workflow::new(config)?;
    info!("Provider chain: {}", workflow.chain().provider_ids().join(" -> "));

    match args.command {
        Commands::Lookup { word, category, retranslate, no_save } => {
            let cancel = CancellationToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current language");
                    ctrl_c_token.cancel();
                }
            });

            let options = SearchOptions {
                category,
                retranslate,
                save: !no_save,
            };

            let pb = ProgressBar::new(Language::COUNT as u64);
            pb.set_style(ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"));

            let started = Instant::now();
            let result = workflow
                .search(&word, &options, &cancel, |done, outcome| {
                    pb.set_position(done as u64);
                    pb.set_message(outcome.language.name());
                })
                .await;
            pb.finish_and_clear();

            match result {
                Ok(SearchOutcome::Found(record)) => {
                    println!("\n'{}' found in dictionary ({})", record.english, record.category);
                    print_record(&record);
                }
                Ok(SearchOutcome::Translated { batch, save }) => {
                    print_batch(&batch);
                    println!(
                        "\nQuality: {}/{} accepted ({:.1}%) in {}",
                        batch.accepted_count,
                        batch.total_languages,
                        batch.quality_percentage(),
                        format_duration(started.elapsed().as_secs())
                    );
                    println!("Dictionary: {}", save);
                    println!("Providers used: {}", workflow.usage_report());
                }
                Err(ShabdkoshError::Cancelled) => {
                    println!("Lookup cancelled; nothing was saved.");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Translate { text, lang } => {
            let language: Language = lang.parse()?;
            let result = workflow.translate_text(&text, language).await;
            println!("{} ({}): {}", language.name(), language.native_name(), result.text);
            println!("Provider: {}", result.provider_id);
        }
        Commands::Add { word, category, translations } => {
            let translations = parse_translation_pairs(&translations)?;
            let status = workflow.add_word(&word, category.as_deref(), translations).await?;
            println!("'{}': {}", word.trim(), status);
        }
        Commands::Search { fragment } => {
            let records = workflow.search_store(&fragment).await?;
            if records.is_empty() {
                println!("No dictionary words contain '{}'.", fragment.trim());
            } else {
                println!("\n{:<30} {:<15} {:<8}", "English", "Category", "Filled");
                println!("{}", "-".repeat(55));
                for record in records {
                    println!(
                        "{:<30} {:<15} {}/{}",
                        record.english,
                        record.category,
                        record.translations.filled_count(),
                        Language::COUNT
                    );
                }
            }
        }
        Commands::Import { file } => {
            let summary = workflow.import_seed(&file).await?;
            println!(
                "Imported {} words from {} ({} already present)",
                summary.inserted,
                file.display(),
                summary.skipped
            );
        }
        Commands::Stats => {
            let count = workflow.word_count().await?;
            println!("\nDictionary Statistics:");
            println!("Words: {}", count);
            println!("Languages: {}", Language::COUNT);
            println!("Providers: {}", workflow.chain().provider_ids().join(" -> "));
            println!("Save threshold: {} of {} languages", threshold.0, threshold.1);
        }
        Commands::Health => {
            println!("\n{:<12} {:<10} {}", "Provider", "Status", "Detail");
            println!("{}", "-".repeat(60));
            for health in workflow.check_providers().await {
                match health.status {
                    Ok(()) => println!("{:<12} {:<10}", health.provider_id, "OK"),
                    Err(e) => println!("{:<12} {:<10} {}", health.provider_id, "FAILED", e),
                }
            }
        }
        Commands::InitConfig { .. } | Commands::Languages => unreachable!("handled before workflow setup"),
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".shabdkosh").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "shabdkosh.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("shabdkosh.log").display());

    Ok(())
}

/// Parse `language=text` pairs given on the command line
fn parse_translation_pairs(pairs: &[String]) -> Result<Translations> {
    let mut translations = Translations::empty();
    for pair in pairs {
        let (lang, text) = pair
            .split_once('=')
            .ok_or_else(|| ShabdkoshError::InvalidInput(format!("Expected LANG=TEXT, got '{}'", pair)))?;
        let language: Language = lang.trim().parse()?;
        translations.set(language, text.trim());
    }
    Ok(translations)
}

fn print_languages() {
    println!("\n{:<12} {:<8} {:<20}", "Language", "Code", "Native name");
    println!("{}", "-".repeat(42));
    for language in Language::ALL {
        println!("{:<12} {:<8} {:<20}", language.name(), language.iso_code(), language.native_name());
    }
}

fn print_record(record: &WordRecord) {
    println!("\n{:<12} {:<20} {}", "Language", "Native name", "Translation");
    println!("{}", "-".repeat(60));
    for (language, text) in record.translations.iter() {
        let text = if text.is_empty() { "-" } else { text };
        println!("{:<12} {:<20} {}", language.name(), language.native_name(), text);
    }
}

fn print_batch(batch: &BatchResult) {
    println!("\nTranslations of '{}':", batch.source_text);
    println!("{:<12} {:<20} {:<12} {}", "Language", "Native name", "Provider", "Translation");
    println!("{}", "-".repeat(72));
    for outcome in batch.outcomes.values() {
        let mark = if outcome.accepted { "" } else { "  (not accepted)" };
        println!(
            "{:<12} {:<20} {:<12} {}{}",
            outcome.language.name(),
            outcome.language.native_name(),
            outcome.provider_id,
            outcome.text,
            mark
        );
    }
}

/// Format duration in seconds to human readable string
fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
