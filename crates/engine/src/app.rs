//! Application composition: wires ports, the cache, and the orchestrator.

use std::sync::Arc;

use crate::infrastructure::app_settings::{LlmRole, TacticianSettings};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::llm::{build_llm_client, UnavailableLlm};
use crate::infrastructure::ports::{
    ClockPort, GameStateError, GameStatePort, LlmError, LlmPort, LlmRequest, RecommendationSink,
};
use crate::use_cases::combat::precache_encounter;
use crate::use_cases::{ActionDescriptionCache, CombatSituationAnalyzer, TurnOrchestrator};

/// Main application state.
pub struct App {
    pub settings: TacticianSettings,
    /// Backend that condenses item descriptions.
    pub cache_llm: Arc<dyn LlmPort>,
    /// Backend that recommends turns.
    pub combat_llm: Arc<dyn LlmPort>,
    pub cache: Arc<ActionDescriptionCache>,
    pub orchestrator: TurnOrchestrator,
    game: Arc<dyn GameStatePort>,
}

impl App {
    /// Build both configured text-generation backends and wire everything around them.
    ///
    /// A backend that cannot be built (a hosted provider without a key) is
    /// replaced by one that always fails, so its callers fall back.
    pub fn from_settings(
        settings: TacticianSettings,
        game: Arc<dyn GameStatePort>,
        sink: Arc<dyn RecommendationSink>,
    ) -> Self {
        let build = |role: LlmRole| -> Arc<dyn LlmPort> {
            match build_llm_client(settings.llm(role)) {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!(
                        role = %role,
                        error = %e,
                        "Text-generation backend not configured"
                    );
                    Arc::new(UnavailableLlm::new(format!("{} backend: {}", role, e)))
                }
            }
        };
        let cache_llm = build(LlmRole::ActionCache);
        let combat_llm = build(LlmRole::Combat);

        Self::new(settings, cache_llm, combat_llm, Arc::new(SystemClock), game, sink)
    }

    /// Create a new App with all dependencies supplied.
    pub fn new(
        settings: TacticianSettings,
        cache_llm: Arc<dyn LlmPort>,
        combat_llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        game: Arc<dyn GameStatePort>,
        sink: Arc<dyn RecommendationSink>,
    ) -> Self {
        let cache = Arc::new(ActionDescriptionCache::new(
            cache_llm.clone(),
            clock,
            settings.cache_ttl,
        ));
        let analyzer = CombatSituationAnalyzer::new(cache.clone(), settings.recent_action_limit);
        let orchestrator = TurnOrchestrator::new(
            game.clone(),
            sink,
            combat_llm.clone(),
            analyzer,
            settings.difficulty,
            settings.recommendation_count,
        );

        Self {
            settings,
            cache_llm,
            combat_llm,
            cache,
            orchestrator,
            game,
        }
    }

    /// One tiny generation round-trip against the backend serving `role`.
    pub async fn test_connection(&self, role: LlmRole) -> Result<(), LlmError> {
        let llm = match role {
            LlmRole::ActionCache => &self.cache_llm,
            LlmRole::Combat => &self.combat_llm,
        };
        let provider = self.settings.llm(role).provider;
        let request = LlmRequest::from_prompt("Reply with the single word: ready")
            .with_temperature(0.0)
            .with_max_tokens(Some(10));

        match llm.generate(request).await {
            Ok(response) => {
                tracing::info!(
                    role = %role,
                    provider = %provider,
                    reply = %response.content.trim(),
                    "Text-generation backend reachable"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    role = %role,
                    provider = %provider,
                    error = %e,
                    "Text-generation backend unreachable"
                );
                Err(e)
            }
        }
    }

    /// Read the current encounter and warm the cache for its NPCs.
    pub async fn precache(&self) -> Result<usize, GameStateError> {
        let encounter = self.game.current_encounter().await?;
        Ok(precache_encounter(&self.cache, &encounter).await)
    }

    /// Drop every cached description, e.g. when combat ends.
    pub async fn end_combat(&self) {
        self.cache.invalidate_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::app_settings::{LlmProvider, LlmSettings};
    use crate::infrastructure::ports::{MockGameStatePort, MockRecommendationSink};
    use crate::test_fixtures::{manual_clock, skirmish, FailingLlm, ScriptedLlm};
    use crate::use_cases::combat::RecommendationSource;
    use tactician_domain::CombatantId;

    fn game_with_skirmish() -> Arc<dyn GameStatePort> {
        let mut game = MockGameStatePort::new();
        game.expect_current_encounter()
            .returning(|| Ok(skirmish()));
        Arc::new(game)
    }

    fn presenting_sink() -> Arc<MockRecommendationSink> {
        let mut sink = MockRecommendationSink::new();
        sink.expect_present().returning(|_, _| ());
        sink.expect_notify_failure().never();
        Arc::new(sink)
    }

    fn app_with(cache_llm: Arc<dyn LlmPort>, combat_llm: Arc<dyn LlmPort>) -> App {
        App::new(
            TacticianSettings::default(),
            cache_llm,
            combat_llm,
            manual_clock(),
            game_with_skirmish(),
            Arc::new(MockRecommendationSink::new()),
        )
    }

    #[tokio::test]
    async fn each_call_reaches_its_own_backend() {
        let cache_llm = Arc::new(ScriptedLlm::replying("not json"));
        let combat_llm = Arc::new(ScriptedLlm::replying(
            r#"{"action":[{"action":"Scimitar","reasoning":"Close and cut","priority":1}]}"#,
        ));
        let app = App::new(
            TacticianSettings::default(),
            cache_llm.clone(),
            combat_llm.clone(),
            manual_clock(),
            game_with_skirmish(),
            presenting_sink(),
        );

        let report = app
            .orchestrator
            .handle_turn(&CombatantId::new("gob-1"))
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(report.source, RecommendationSource::Generated(_)));
        assert_eq!(cache_llm.calls(), 1);
        assert_eq!(combat_llm.calls(), 1);
        assert!(!cache_llm.prompts()[0].contains("## Difficulty"));
        assert!(combat_llm.prompts()[0].contains("## Difficulty: normal"));
    }

    #[tokio::test]
    async fn precache_only_uses_the_cache_backend() {
        let cache_llm = Arc::new(ScriptedLlm::replying("not json"));
        let combat_llm = Arc::new(FailingLlm::new());
        let app = app_with(cache_llm.clone(), combat_llm.clone());

        assert_eq!(app.precache().await.unwrap(), 2);

        assert_eq!(cache_llm.calls(), 2);
        assert_eq!(combat_llm.calls(), 0);
    }

    #[tokio::test]
    async fn unbuildable_backend_falls_back_instead_of_failing() {
        let mut settings = TacticianSettings::default();
        settings.cache_llm = LlmSettings::for_provider(LlmProvider::Anthropic);
        let app = App::from_settings(settings, game_with_skirmish(), presenting_sink());

        let report = app
            .orchestrator
            .handle_turn(&CombatantId::new("gob-1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.source, RecommendationSource::Fallback);
        let err = app.test_connection(LlmRole::Combat).await.unwrap_err();
        assert!(matches!(err, LlmError::Configuration(msg) if msg.starts_with("combat backend")));
    }

    #[tokio::test]
    async fn test_connection_reports_backend_errors() {
        let app = app_with(Arc::new(ScriptedLlm::replying("ready")), Arc::new(FailingLlm::new()));

        assert!(app.test_connection(LlmRole::ActionCache).await.is_ok());
        let err = app.test_connection(LlmRole::Combat).await.unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_connection_succeeds_on_any_reply() {
        let llm = Arc::new(ScriptedLlm::replying("ready"));
        let app = app_with(Arc::new(FailingLlm::new()), llm.clone());

        assert!(app.test_connection(LlmRole::Combat).await.is_ok());
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn precache_then_end_combat_empties_the_cache() {
        let app = app_with(
            Arc::new(ScriptedLlm::replying("not json")),
            Arc::new(FailingLlm::new()),
        );

        assert_eq!(app.precache().await.unwrap(), 2);
        assert_eq!(app.cache.len().await, 2);

        app.end_combat().await;
        assert!(app.cache.is_empty().await);
    }

    #[tokio::test]
    async fn precache_surfaces_game_state_errors() {
        let mut game = MockGameStatePort::new();
        game.expect_current_encounter()
            .returning(|| Err(GameStateError::Unavailable("no file".into())));
        let llm = Arc::new(ScriptedLlm::replying("[]"));
        let app = App::new(
            TacticianSettings::default(),
            llm.clone(),
            llm,
            manual_clock(),
            Arc::new(game),
            Arc::new(MockRecommendationSink::new()),
        );

        assert!(app.precache().await.is_err());
    }
}
