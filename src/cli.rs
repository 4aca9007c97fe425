use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Keep the dictionary in memory only for this run
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look a word up, translating it into all 22 languages if it is new
    Lookup {
        /// English word or phrase
        word: String,

        /// Category for a newly saved word
        #[arg(short = 'g', long)]
        category: Option<String>,

        /// Translate again even if the word is in the dictionary
        #[arg(long)]
        retranslate: bool,

        /// Do not save the translations
        #[arg(long)]
        no_save: bool,
    },

    /// Translate text into a single language
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: String,

        /// Target language name or code (e.g. hindi, ta)
        #[arg(short, long)]
        lang: String,
    },

    /// Add a word with hand-entered translations
    Add {
        /// English word
        #[arg(short, long)]
        word: String,

        /// Category of the word
        #[arg(short = 'g', long)]
        category: Option<String>,

        /// Translation as language=text (repeatable)
        #[arg(short, long = "set", value_name = "LANG=TEXT")]
        translations: Vec<String>,
    },

    /// Find dictionary words containing a fragment
    Search {
        /// Part of an English word
        fragment: String,
    },

    /// Import a seed word list ({category: {word: {language: text}}})
    Import {
        /// Seed JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show dictionary statistics
    Stats,

    /// List supported languages
    Languages,

    /// Check that configured providers are reachable
    Health,

    /// Write the default configuration to a file
    InitConfig {
        /// Output file
        #[arg(short, long, default_value = "shabdkosh.toml")]
        output: PathBuf,
    },
}
