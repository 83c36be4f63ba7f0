//! Tactician Engine - recommend the active NPC's turn from an encounter snapshot.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tactician_engine::infrastructure::app_settings::{LlmRole, TacticianSettings};
use tactician_engine::infrastructure::console_sink::ConsoleSink;
use tactician_engine::infrastructure::game_state::JsonEncounterFile;
use tactician_engine::infrastructure::ports::GameStatePort;
use tactician_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root, then the working directory.
    load_dotenv_from_repo_root();

    let settings = TacticianSettings::from_env();

    // Initialize logging
    let default_filter = if settings.debug_logging {
        "tactician_engine=debug"
    } else {
        "tactician_engine=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        difficulty = %settings.difficulty,
        cache_provider = %settings.cache_llm.provider,
        combat_provider = %settings.combat_llm.provider,
        "Starting Tactician Engine"
    );
    for issue in settings.issues() {
        tracing::warn!("Configuration: {}", issue);
    }

    let encounter_path = std::env::args()
        .nth(1)
        .or_else(|| settings.encounter_path.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no encounter file: pass a path or set TACTICIAN_ENCOUNTER_PATH")
        })?;

    let game = Arc::new(JsonEncounterFile::new(&encounter_path));
    let app = App::from_settings(settings, game.clone(), Arc::new(ConsoleSink));

    if app.test_connection(LlmRole::ActionCache).await.is_err() {
        tracing::warn!("Continuing; action descriptions will come from the items themselves");
    }
    if app.test_connection(LlmRole::Combat).await.is_err() {
        tracing::warn!("Continuing; recommendations will fall back to static suggestions");
    }

    let described = app.precache().await?;
    tracing::debug!(described, "Action cache warmed");

    let encounter = game.current_encounter().await?;
    if encounter.active_combatant.is_some() {
        app.orchestrator.handle_active_turn().await?;
    } else {
        // No turn marker in the snapshot: recommend for every living NPC in order.
        for npc in encounter.active_npcs() {
            app.orchestrator.handle_turn(&npc.id).await?;
        }
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
    let _ = dotenvy::dotenv();
}
