//! Action description cache.
//!
//! Maps an entity to the condensed descriptions of its abilities, generated
//! once per freshness window. Generation is expensive and fallible; a failure
//! (or an unreadable response) is replaced by descriptions derived from the
//! items themselves, so lookups never fail.
//!
//! At most one generation runs per entity at a time: callers that find the
//! entry missing or stale queue on a per-entity gate and re-check freshness
//! once they hold it, so the second caller reads what the first one stored.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tactician_domain::{CombatantId, ContentItem, FinalAction, RawAction};
use tokio::sync::Mutex;

use super::fallback::{cap_description, fallback_actions};
use super::normalizer::normalize;
use crate::infrastructure::cache::StampedStore;
use crate::infrastructure::ports::{ClockPort, LlmPort, LlmRequest};
use crate::use_cases::parsing::{parse_action_descriptions, ParseTier};
use crate::use_cases::prompts::{build_description_prompt, DESCRIPTION_SYSTEM_PROMPT};

/// Low temperature: descriptions should be stable, not creative.
const DESCRIPTION_TEMPERATURE: f32 = 0.3;

pub struct ActionDescriptionCache {
    entries: StampedStore<CombatantId, Vec<FinalAction>>,
    gates: DashMap<CombatantId, Arc<Mutex<()>>>,
    llm: Arc<dyn LlmPort>,
}

impl ActionDescriptionCache {
    pub fn new(llm: Arc<dyn LlmPort>, clock: Arc<dyn ClockPort>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            entries: StampedStore::new(ttl, clock),
            gates: DashMap::new(),
            llm,
        }
    }

    /// Condensed actions for `id`, generating them if the stored entry is
    /// missing or stale.
    ///
    /// Items without activities are ignored; if none remain, the result is
    /// empty and nothing is stored.
    pub async fn get_actions(
        &self,
        id: &CombatantId,
        entity_name: &str,
        items: &[ContentItem],
    ) -> Vec<FinalAction> {
        if let Some(actions) = self.entries.fresh(id).await {
            tracing::debug!(combatant = %id, "Action cache hit");
            return actions;
        }

        let gate = self.gate(id);
        let _guard = gate.lock().await;

        // Another caller may have refreshed the entry while we waited
        if let Some(actions) = self.entries.fresh(id).await {
            tracing::debug!(combatant = %id, "Action cache filled while waiting");
            return actions;
        }

        let raw = normalize(items);
        if raw.is_empty() {
            tracing::debug!(combatant = %id, "No actionable items, nothing cached");
            return Vec::new();
        }

        tracing::debug!(combatant = %id, actions = raw.len(), "Action cache miss, generating");
        let actions = self.describe(id, entity_name, &raw).await;
        self.entries.put(id.clone(), actions.clone()).await;
        actions
    }

    async fn describe(
        &self,
        id: &CombatantId,
        entity_name: &str,
        raw: &[RawAction],
    ) -> Vec<FinalAction> {
        let request = LlmRequest::from_prompt(build_description_prompt(entity_name, raw))
            .with_system_prompt(DESCRIPTION_SYSTEM_PROMPT)
            .with_temperature(DESCRIPTION_TEMPERATURE);

        match self.llm.generate(request).await {
            Ok(response) => {
                if response.truncated() {
                    tracing::warn!(combatant = %id, "Description response hit the token limit");
                }
                let parsed = parse_action_descriptions(&response.content, raw);
                if parsed.tier != ParseTier::Json {
                    tracing::warn!(
                        combatant = %id,
                        tier = %parsed.tier,
                        "Description response was not the expected JSON"
                    );
                }
                parsed.actions.into_iter().map(cap_description).collect()
            }
            Err(e) => {
                tracing::warn!(
                    combatant = %id,
                    error = %e,
                    "Description generation failed, using item descriptions"
                );
                fallback_actions(raw)
            }
        }
    }

    fn gate(&self, id: &CombatantId) -> Arc<Mutex<()>> {
        self.gates.entry(id.clone()).or_default().clone()
    }

    /// Drop the entry for `id`; the next lookup regenerates.
    pub async fn invalidate(&self, id: &CombatantId) {
        self.entries.evict(id).await;
        self.gates.remove_if(id, |_, gate| Arc::strong_count(gate) == 1);
    }

    pub async fn invalidate_all(&self) {
        self.entries.evict_all().await;
        self.release_idle_gates();
    }

    /// Remove every entry whose age has reached the freshness window.
    pub async fn sweep_expired(&self) -> usize {
        let removed = self.entries.sweep().await;
        self.release_idle_gates();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired action descriptions");
        }
        removed
    }

    /// Gates nobody is holding or waiting on.
    fn release_idle_gates(&self) {
        self.gates.retain(|_, gate| Arc::strong_count(gate) > 1);
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.is_empty().await
    }

    /// When the entry for `id` was last (re)generated.
    pub async fn stored_at(&self, id: &CombatantId) -> Option<DateTime<Utc>> {
        self.entries.stored_at(id).await
    }

    #[cfg(test)]
    fn gate_count(&self) -> usize {
        self.gates.len()
    }
}
