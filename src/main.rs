use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::llm::{GenerationBackend, ensure_ai_models_present, warm_ai_models};
use crate::preset_store::JsonFilePresetStore;
use crate::suggestions::ContextSuggester;
use crate::translation::Translator;
use crate::translation_service::TranslationService;
use crate::tui::TuiApp;
use crate::tui::workspace::WorkspaceState;
use crate::workflow::{Phase, WorkflowController};

mod clipboard;
mod config;
mod entities;
mod error;
mod generation;
mod llm;
mod preset_store;
mod remote;
mod suggestions;
#[cfg(test)]
mod test_util;
mod translation;
mod translation_service;
mod tui;
mod workflow;

/// Four AI translations for any prompt.
#[derive(Debug, Parser)]
#[command(name = "quadslator", version)]
struct Cli {
    /// Config file to use instead of ~/.config/quadslator/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Translate once and print the four results
    Translate {
        prompt: String,
        /// Context to steer the translation; blank means "general"
        #[arg(long, default_value = "")]
        context: String,
        /// Load the context from a saved preset
        #[arg(long, conflicts_with = "context")]
        preset: Option<String>,
    },
    /// Ask the model for contexts that would help translate a prompt
    Suggest { prompt: String },
    /// Download and warm the local model
    Prepare,
}

fn init_logging() -> Result<()> {
    let dir = Config::data_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    let log_file = File::create(dir.join("quadslator.log")).context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quadslator=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = Config::load(cli.config)?;
    let store = JsonFilePresetStore::new(config.presets_file()?);
    tracing::info!("Using saved contexts at {}", store.path().display());

    match cli.command {
        None => run_tui(config, store),
        Some(Command::Translate {
            prompt,
            context,
            preset,
        }) => translate_once(&config, store, prompt, context, preset).await,
        Some(Command::Suggest { prompt }) => suggest(&config, &prompt).await,
        Some(Command::Prepare) => {
            ensure_ai_models_present().await?;
            warm_ai_models().await?;
            println!("Local model is ready.");
            Ok(())
        }
    }
}

fn run_tui(config: Config, store: JsonFilePresetStore) -> Result<()> {
    let service = if config.disable_ai {
        TranslationService::disabled()
    } else {
        TranslationService::new(config.generation.clone())
    };
    let mut app = TuiApp::new(WorkspaceState::new(WorkflowController::new(store)), service);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}

async fn translate_once(
    config: &Config,
    store: JsonFilePresetStore,
    prompt: String,
    context: String,
    preset: Option<String>,
) -> Result<()> {
    if config.disable_ai {
        bail!("AI is disabled in the configuration");
    }

    let mut controller = WorkflowController::new(store);
    for notification in controller.notifications() {
        eprintln!("{}: {}", notification.title, notification.description);
    }
    controller.prompt = prompt;
    controller.context = context;
    if let Some(name) = preset {
        if !controller.select_preset(&name) {
            bail!("No saved context named {name:?}");
        }
    }

    let translator = Translator::new(GenerationBackend::from_config(&config.generation).await?);
    match controller.translate_now(&translator).await? {
        Phase::Succeeded => {
            for (i, translation) in controller.translations().iter().enumerate() {
                println!("Translation #{}: {}", i + 1, translation);
            }
            Ok(())
        }
        _ => match controller.last_error() {
            Some(e) => bail!("Translation failed: {e}"),
            None => bail!("Translation failed"),
        },
    }
}

async fn suggest(config: &Config, prompt: &str) -> Result<()> {
    if config.disable_ai {
        bail!("AI is disabled in the configuration");
    }

    let suggester = ContextSuggester::new(GenerationBackend::from_config(&config.generation).await?);
    for suggestion in suggester.suggest_contexts(prompt).await? {
        println!("- {suggestion}");
    }
    Ok(())
}
