//! # mnemo CLI
//!
//! ## Available Commands
//!
//! - `add` - Create a card
//! - `list` - List all cards
//! - `due` - List cards due for review
//! - `review` - Interactive review session over due cards
//! - `stats` - Show card statistics
//! - `delete` - Delete a card

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::*;

/// mnemo - spaced-repetition memorization trainer
#[derive(Parser, Debug)]
#[command(name = "mnemo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the card database (overrides the configured storage)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a card
    Add {
        /// Question side
        concept: String,

        /// Expected answer. May be omitted for concept cards to generate a definition.
        #[arg(default_value = "")]
        answer: String,

        /// Card type (word, concept)
        #[arg(short = 't', long = "type", default_value = "word")]
        card_type: String,
    },

    /// List all cards
    List,

    /// List cards due for review
    Due,

    /// Review due cards interactively
    Review {
        /// Include cards that are not yet due
        #[arg(long)]
        all: bool,
    },

    /// Show card statistics
    Stats,

    /// Delete a card
    Delete {
        /// Card id
        id: String,
    },
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load(cli.config.as_deref(), cli.database)?;

    match cli.command {
        Commands::Add {
            concept,
            answer,
            card_type,
        } => cmd_add(&ctx, &concept, &answer, &card_type).await,
        Commands::List => cmd_list(&ctx),
        Commands::Due => cmd_due(&ctx),
        Commands::Review { all } => cmd_review(&ctx, all).await,
        Commands::Stats => cmd_stats(&ctx),
        Commands::Delete { id } => cmd_delete(&ctx, &id),
    }
}
