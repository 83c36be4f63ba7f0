//! Shared test helpers: fake text-generation backends and encounter builders.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{goblin, ScriptedLlm};
//!
//! let llm = Arc::new(ScriptedLlm::replying("[]"));
//! let npc = goblin("gob-1");
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use tactician_domain::{
    Combatant, CombatantId, ContentItem, Encounter, Position, Vitals, DEFAULT_GRID_SIZE,
};

use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

// =============================================================================
// Fake LLMs
// =============================================================================

/// Replies with scripted text, repeating the last reply once the script runs out.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    last_reply: Mutex<String>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::script(vec![reply.into()])
    }

    pub fn script(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last_reply: Mutex::new(String::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Suspend for `delay` before replying, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let mut last = self.last_reply.lock().unwrap();
            if let Some(next) = self.replies.lock().unwrap().pop_front() {
                *last = next;
            }
            last.clone()
        };
        Ok(LlmResponse::text(reply))
    }
}

/// Always fails, the way an unreachable backend does.
pub struct FailingLlm {
    calls: AtomicUsize,
}

impl FailingLlm {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmPort for FailingLlm {
    async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::RequestFailed("connection refused".into()))
    }
}

// =============================================================================
// Clock
// =============================================================================

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ))
}

// =============================================================================
// Content and combatants
// =============================================================================

pub fn scimitar() -> ContentItem {
    ContentItem::new("Scimitar", "weapon")
        .with_description("<p><em>Melee Weapon Attack:</em> +4 to hit, reach 5 ft.</p>")
        .with_activities(json!({
            "atk1": {
                "type": "attack",
                "activation": { "type": "action" },
                "damage": { "parts": [["1d6+2", "slashing"]] },
                "range": { "value": 5, "units": "ft" }
            }
        }))
}

pub fn shortbow() -> ContentItem {
    ContentItem::new("Shortbow", "weapon")
        .with_description("Ranged Weapon Attack: +4 to hit, range 80/320 ft.")
        .with_activities(json!([{
            "type": "attack",
            "activation": { "type": "action" },
            "damage": { "parts": [{ "number": 1, "denomination": 6, "bonus": "2", "types": ["piercing"] }] },
            "range": { "value": 80, "long": 320, "units": "ft" }
        }]))
}

pub fn nimble_escape() -> ContentItem {
    ContentItem::new("Nimble Escape", "feat")
        .with_description("The goblin can take the Disengage or Hide action as a bonus action.")
        .with_activities(json!({ "ne": { "type": "utility", "activation": { "type": "bonus" } } }))
}

/// Item with no activities; never reaches the cache.
pub fn trinket() -> ContentItem {
    ContentItem::new("Lucky Stone", "loot").with_description("A smooth pebble.")
}

pub fn combatant(id: &str, name: &str, player_controlled: bool) -> Combatant {
    Combatant {
        id: CombatantId::new(id),
        name: name.to_string(),
        initiative: None,
        player_controlled,
        defeated: false,
        vitals: Vitals {
            hp: 10,
            hp_max: 10,
            armor_class: 12,
            speed: 30,
        },
        position: Position::default(),
        conditions: vec![],
        resources: Default::default(),
        items: vec![],
    }
}

pub fn goblin(id: &str) -> Combatant {
    Combatant {
        items: vec![scimitar(), shortbow(), nimble_escape(), trinket()],
        vitals: Vitals {
            hp: 7,
            hp_max: 7,
            armor_class: 15,
            speed: 30,
        },
        ..combatant(id, "Goblin", false)
    }
}

pub fn fighter(id: &str) -> Combatant {
    Combatant {
        vitals: Vitals {
            hp: 24,
            hp_max: 44,
            armor_class: 18,
            speed: 30,
        },
        ..combatant(id, "Fighter", true)
    }
}

pub fn at(mut combatant: Combatant, x: f64, y: f64, initiative: f64) -> Combatant {
    combatant.position = Position::new(x, y);
    combatant.initiative = Some(initiative);
    combatant
}

/// Two goblins against a fighter, first goblin acting.
pub fn skirmish() -> Encounter {
    Encounter {
        round: 2,
        active_combatant: Some(CombatantId::new("gob-1")),
        grid_size: DEFAULT_GRID_SIZE,
        combatants: vec![
            at(goblin("gob-1"), 0.0, 0.0, 15.0),
            at(fighter("pc-1"), 300.0, 400.0, 12.0),
            at(goblin("gob-2"), 100.0, 0.0, 8.0),
        ],
        action_log: vec![
            "Fighter attacks Goblin (gob-2) with Longsword: hit for 6".into(),
            "Goblin (gob-1) shoots Fighter: miss".into(),
        ],
    }
}
