//! Drives one NPC turn from encounter read to displayed recommendations.
//!
//! Phases: `Idle -> Analyzing -> Recommending -> Idle`. The phase returns to
//! `Idle` however the turn ends, including when the future is dropped.
//! Generation and parse failures are absorbed (static fallback set, parse
//! sentinel); only a missing encounter or combatant fails the turn, and that
//! failure is reported to the sink once.

use std::sync::Arc;

use tactician_domain::{group_by_category, CombatantId, Difficulty, RecommendationSet};
use tokio::sync::watch;
use tracing::Instrument;

use super::fallback::fallback_recommendations;
use super::situation::CombatSituationAnalyzer;
use crate::infrastructure::correlation::TurnId;
use crate::infrastructure::ports::{
    GameStateError, GameStatePort, LlmPort, LlmRequest, RecommendationSink,
};
use crate::use_cases::parsing::{parse_recommendations, ParseTier};
use crate::use_cases::prompts::{build_recommendation_prompt, RECOMMENDATION_SYSTEM_PROMPT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Analyzing,
    Recommending,
}

/// Where a turn's recommendations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    /// Parsed from a generated response; the tier says how.
    Generated(ParseTier),
    /// Generation failed; static set for the difficulty.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub turn_id: TurnId,
    pub combatant: CombatantId,
    pub recommendations: RecommendationSet,
    pub source: RecommendationSource,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("No combatant is taking a turn")]
    NoActiveCombatant,
    #[error("Combatant '{0}' is not in the encounter")]
    CombatantNotFound(CombatantId),
    #[error(transparent)]
    GameState(#[from] GameStateError),
}

pub struct TurnOrchestrator {
    game: Arc<dyn GameStatePort>,
    sink: Arc<dyn RecommendationSink>,
    llm: Arc<dyn LlmPort>,
    analyzer: CombatSituationAnalyzer,
    difficulty: Difficulty,
    recommendation_count: usize,
    phase: watch::Sender<TurnPhase>,
}

/// Puts the phase back to `Idle` on drop.
struct PhaseReset<'a>(&'a watch::Sender<TurnPhase>);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        self.0.send_replace(TurnPhase::Idle);
    }
}

impl TurnOrchestrator {
    pub fn new(
        game: Arc<dyn GameStatePort>,
        sink: Arc<dyn RecommendationSink>,
        llm: Arc<dyn LlmPort>,
        analyzer: CombatSituationAnalyzer,
        difficulty: Difficulty,
        recommendation_count: usize,
    ) -> Self {
        let (phase, _) = watch::channel(TurnPhase::Idle);
        Self {
            game,
            sink,
            llm,
            analyzer,
            difficulty,
            recommendation_count: tactician_domain::clamp_recommendation_count(
                recommendation_count,
            ),
            phase,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<TurnPhase> {
        self.phase.subscribe()
    }

    /// Recommend a turn for `id`.
    ///
    /// `Ok(None)` when the combatant is player-controlled or defeated.
    pub async fn handle_turn(&self, id: &CombatantId) -> Result<Option<TurnReport>, TurnError> {
        self.run(Some(id.clone())).await
    }

    /// Recommend a turn for whoever the encounter marks as active.
    pub async fn handle_active_turn(&self) -> Result<Option<TurnReport>, TurnError> {
        self.run(None).await
    }

    async fn run(&self, target: Option<CombatantId>) -> Result<Option<TurnReport>, TurnError> {
        let turn_id = TurnId::new();
        let span = tracing::info_span!(
            "npc_turn",
            turn = %turn_id.short(),
            combatant = tracing::field::Empty
        );

        async move {
            let _reset = PhaseReset(&self.phase);
            let result = self.execute(turn_id, target).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Turn handling failed");
                self.sink
                    .notify_failure(&format!("Could not recommend a turn: {}", e))
                    .await;
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        turn_id: TurnId,
        target: Option<CombatantId>,
    ) -> Result<Option<TurnReport>, TurnError> {
        self.phase.send_replace(TurnPhase::Analyzing);

        let encounter = self.game.current_encounter().await?;
        let id = match target {
            Some(id) => id,
            None => encounter
                .active_combatant
                .clone()
                .ok_or(TurnError::NoActiveCombatant)?,
        };
        tracing::Span::current().record("combatant", tracing::field::display(&id));

        let npc = encounter
            .combatant(&id)
            .ok_or_else(|| TurnError::CombatantNotFound(id.clone()))?;
        if npc.player_controlled {
            tracing::debug!("Player-controlled combatant, no recommendation");
            return Ok(None);
        }
        if npc.is_defeated() {
            tracing::debug!("Defeated combatant, no recommendation");
            return Ok(None);
        }

        tracing::info!(name = %npc.name, round = encounter.round, "Analyzing NPC turn");
        let situation = self.analyzer.analyze(&encounter, npc).await;

        self.phase.send_replace(TurnPhase::Recommending);
        let grouped = group_by_category(&situation.actions);
        let prompt = build_recommendation_prompt(
            &situation,
            self.difficulty,
            &grouped,
            self.recommendation_count,
        );
        tracing::debug!(prompt_len = prompt.len(), "Requesting recommendations");
        let request =
            LlmRequest::from_prompt(prompt).with_system_prompt(RECOMMENDATION_SYSTEM_PROMPT);

        let (recommendations, source) = match self.llm.generate(request).await {
            Ok(response) => {
                if let Some(usage) = response.usage {
                    tracing::debug!(tokens = usage.total(), "Recommendation response received");
                }
                let parsed = parse_recommendations(&response.content);
                if parsed.tier != ParseTier::Json {
                    tracing::warn!(
                        tier = %parsed.tier,
                        truncated = response.truncated(),
                        "Recommendation response was not the expected JSON"
                    );
                }
                (parsed.set, RecommendationSource::Generated(parsed.tier))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation generation failed, using fallback");
                (
                    fallback_recommendations(
                        self.difficulty,
                        &grouped,
                        self.recommendation_count,
                    ),
                    RecommendationSource::Fallback,
                )
            }
        };

        self.sink.present(npc, &recommendations).await;
        tracing::info!(
            recommendations = recommendations.total(),
            source = ?source,
            "Recommendations presented"
        );

        Ok(Some(TurnReport {
            turn_id,
            combatant: id,
            recommendations,
            source,
        }))
    }
}
