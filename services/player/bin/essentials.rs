//! Main Entrypoint for the Essentials Player
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Opening the audio output when playback is requested.
//! 4. Running the `list` and `show` commands against an `ExperienceSession`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use essentials_core::{
    Notice, catalog, language::Language, playback::PlaybackState, session::GenerationState,
};
use essentials_player::{audio, audio::RodioBackend, config::Config, state::AppState};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "essentials", version, about = "Guided micro-experiences for the nine essentials")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the nine principles.
    List {
        /// Language code (tr, en, de). Defaults to APP_LANGUAGE.
        #[arg(long)]
        lang: Option<Language>,
    },
    /// Generates an experience for one principle.
    Show {
        /// Principle id, 1 to 9.
        id: u32,
        #[arg(long)]
        lang: Option<Language>,
        /// Play the experience as speech over background music.
        #[arg(long)]
        listen: bool,
        /// Use the built-in experience text instead of the generation API.
        #[arg(long)]
        offline: bool,
    },
}

fn print_notices(notices: &mut mpsc::Receiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        match notice {
            Notice::PlaybackFailed { message } => eprintln!("{message}"),
        }
    }
}

fn list(language: Language) {
    let ui = &language.config().ui;
    println!("{}", ui.header_title);
    println!("{}", ui.header_subtitle);
    println!("{}\n", ui.header_desc);
    for principle in catalog::principles(language) {
        println!("{}. {}", principle.id, principle.title);
        println!("   {}", principle.description);
    }
}

async fn show(
    config: Config,
    id: u32,
    language: Language,
    listen: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let principle = catalog::principle(language, id).with_context(|| {
        format!("Unknown principle id {id} (expected 1 to {})", catalog::PRINCIPLE_COUNT)
    })?;
    let ui = &language.config().ui;

    // The stream must outlive every sink created from its handle.
    let (_stream, handle) = if listen {
        match audio::open_output() {
            Ok((stream, handle)) => (Some(stream), Some(handle)),
            Err(e) => {
                warn!(error = %e, "Audio output unavailable");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let backend = Arc::new(RodioBackend::new(handle, config.background_music_url.clone()));
    let (notice_tx, mut notices) = mpsc::channel(8);
    let state = AppState::new(&config, backend, notice_tx, offline);
    let session = state.session.clone();
    session.set_language(language).await;

    println!("{}", ui.modal_loading);
    if session.select(principle).await == GenerationState::Error {
        println!("{}", ui.modal_error);
        return Ok(());
    }

    let snapshot = session.snapshot().await;
    let experience = snapshot
        .experience
        .context("Session reported ready without an experience")?;
    println!("\n{}  ({})\n", experience.title, experience.duration);
    println!("{}\n", experience.content);
    println!("{}", ui.modal_quote);

    if listen {
        println!("\n{}", ui.listen_button);
        println!("{}", ui.audio_loading);
        let mut playback = session.playback().subscribe();
        match session.play().await {
            Ok(PlaybackState::Playing) => {
                println!("{}", ui.stop_button);
                tokio::select! {
                    _ = async {
                        let _ = playback.wait_for(|s| *s == PlaybackState::Stopped).await;
                    } => {
                        session.playback().finish_fade().await;
                        println!("{}", ui.modal_done);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received Ctrl+C. Stopping playback...");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Playback did not start"),
        }
        print_notices(&mut notices);
    }

    session.close().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
    info!(language = %config.language, model = %config.text_model, "Configuration loaded.");

    // --- 3. Run Command ---
    match cli.command {
        Command::List { lang } => list(lang.unwrap_or(config.language)),
        Command::Show {
            id,
            lang,
            listen,
            offline,
        } => {
            let language = lang.unwrap_or(config.language);
            show(config, id, language, listen, offline).await?;
        }
    }
    Ok(())
}
