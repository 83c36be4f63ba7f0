//! Combat situation snapshot for one NPC turn.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tactician_domain::{
    Combatant, CombatantId, Encounter, FinalAction, Position, Resources, Vitals,
};

use crate::use_cases::actions::ActionDescriptionCache;

/// The acting NPC's own state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcStatus {
    pub id: CombatantId,
    pub name: String,
    pub vitals: Vitals,
    pub position: Position,
    pub conditions: Vec<String>,
    pub resources: Resources,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeEntry {
    pub id: CombatantId,
    pub name: String,
    pub initiative: Option<f64>,
    pub player_controlled: bool,
    pub defeated: bool,
    /// Whose turn it is.
    pub active: bool,
}

/// Another combatant as seen from the acting NPC.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantSummary {
    pub id: CombatantId,
    pub name: String,
    pub distance_feet: u32,
    pub hp: i32,
    pub hp_max: i32,
    pub hp_percent: u32,
    pub armor_class: i32,
    pub conditions: Vec<String>,
}

/// Read-only snapshot handed to the recommendation prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSituation {
    pub round: u32,
    pub npc: NpcStatus,
    /// Highest initiative first; ties keep encounter order.
    pub initiative_order: Vec<InitiativeEntry>,
    pub actions: Vec<FinalAction>,
    pub enemies: Vec<CombatantSummary>,
    pub allies: Vec<CombatantSummary>,
    /// Oldest first.
    pub recent_actions: Vec<String>,
}

pub struct CombatSituationAnalyzer {
    cache: Arc<ActionDescriptionCache>,
    recent_action_limit: usize,
}

impl CombatSituationAnalyzer {
    pub fn new(cache: Arc<ActionDescriptionCache>, recent_action_limit: usize) -> Self {
        Self {
            cache,
            recent_action_limit,
        }
    }

    /// Build the snapshot for `npc`. Suspends while its actions are generated
    /// on a cache miss.
    pub async fn analyze(&self, encounter: &Encounter, npc: &Combatant) -> CombatSituation {
        let actions = self
            .cache
            .get_actions(&npc.id, &npc.name, &npc.items)
            .await;

        let (enemies, allies): (Vec<&Combatant>, Vec<&Combatant>) = encounter
            .combatants
            .iter()
            .filter(|c| c.id != npc.id && !c.is_defeated())
            .partition(|c| c.is_hostile_to(npc));

        let summaries = |others: Vec<&Combatant>| -> Vec<CombatantSummary> {
            others
                .into_iter()
                .map(|c| summarize(npc, c, encounter.grid_size))
                .collect()
        };

        CombatSituation {
            round: encounter.round,
            npc: NpcStatus {
                id: npc.id.clone(),
                name: npc.name.clone(),
                vitals: npc.vitals,
                position: npc.position,
                conditions: npc.conditions.clone(),
                resources: npc.resources.clone(),
            },
            initiative_order: initiative_order(encounter),
            actions,
            enemies: summaries(enemies),
            allies: summaries(allies),
            recent_actions: encounter.recent_actions(self.recent_action_limit).to_vec(),
        }
    }
}

/// Every combatant, defeated ones included, by descending initiative.
/// Combatants that have not rolled sort last.
pub fn initiative_order(encounter: &Encounter) -> Vec<InitiativeEntry> {
    let mut order: Vec<&Combatant> = encounter.combatants.iter().collect();
    // stable: equal initiative keeps encounter order
    order.sort_by(|a, b| match (a.initiative, b.initiative) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    order
        .into_iter()
        .map(|c| InitiativeEntry {
            id: c.id.clone(),
            name: c.name.clone(),
            initiative: c.initiative,
            player_controlled: c.player_controlled,
            defeated: c.is_defeated(),
            active: encounter.active_combatant.as_ref() == Some(&c.id),
        })
        .collect()
}

fn summarize(npc: &Combatant, other: &Combatant, grid_size: f64) -> CombatantSummary {
    CombatantSummary {
        id: other.id.clone(),
        name: other.name.clone(),
        distance_feet: npc.position.distance_feet(&other.position, grid_size),
        hp: other.vitals.hp,
        hp_max: other.vitals.hp_max,
        hp_percent: other.vitals.hp_percent(),
        armor_class: other.vitals.armor_class,
        conditions: other.conditions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        at, combatant, fighter, goblin, manual_clock, skirmish, FailingLlm, ScriptedLlm,
    };
    use std::time::Duration;

    fn analyzer() -> CombatSituationAnalyzer {
        let cache = ActionDescriptionCache::new(
            Arc::new(FailingLlm::new()),
            manual_clock(),
            Duration::from_secs(3600),
        );
        CombatSituationAnalyzer::new(Arc::new(cache), 5)
    }

    #[tokio::test]
    async fn classifies_and_measures_others() {
        let encounter = skirmish();
        let npc = encounter.combatants[0].clone();

        let situation = analyzer().analyze(&encounter, &npc).await;

        assert_eq!(situation.enemies.len(), 1);
        assert_eq!(situation.enemies[0].name, "Fighter");
        assert_eq!(situation.enemies[0].distance_feet, 25);
        assert_eq!(situation.enemies[0].hp_percent, 55);
        assert_eq!(situation.allies.len(), 1);
        assert_eq!(situation.allies[0].id, CombatantId::new("gob-2"));
        assert_eq!(situation.allies[0].distance_feet, 5);
        assert_eq!(situation.round, 2);
    }

    #[tokio::test]
    async fn actions_come_from_the_cache() {
        let encounter = skirmish();
        let npc = encounter.combatants[0].clone();

        let situation = analyzer().analyze(&encounter, &npc).await;

        let names: Vec<_> = situation.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Scimitar", "Shortbow", "Nimble Escape"]);
    }

    #[tokio::test]
    async fn defeated_combatants_are_only_in_initiative() {
        let mut encounter = skirmish();
        encounter.combatants[1].vitals.hp = 0;
        let npc = encounter.combatants[0].clone();

        let situation = analyzer().analyze(&encounter, &npc).await;

        assert!(situation.enemies.is_empty());
        assert_eq!(situation.initiative_order.len(), 3);
        assert!(situation.initiative_order[1].defeated);
    }

    #[tokio::test]
    async fn recent_actions_are_limited() {
        let mut encounter = skirmish();
        encounter.action_log = (1..=8).map(|i| format!("event {}", i)).collect();
        let npc = encounter.combatants[0].clone();

        let situation = analyzer().analyze(&encounter, &npc).await;

        assert_eq!(situation.recent_actions.len(), 5);
        assert_eq!(situation.recent_actions[0], "event 4");
        assert_eq!(situation.recent_actions[4], "event 8");
    }

    #[test]
    fn initiative_sorts_descending_with_stable_ties() {
        let encounter = Encounter {
            round: 1,
            active_combatant: Some(CombatantId::new("b")),
            grid_size: 100.0,
            combatants: vec![
                at(combatant("a", "A", false), 0.0, 0.0, 10.0),
                combatant("unrolled", "Unrolled", false),
                at(combatant("b", "B", true), 0.0, 0.0, 18.0),
                at(combatant("c", "C", false), 0.0, 0.0, 10.0),
            ],
            action_log: vec![],
        };

        let order = initiative_order(&encounter);
        let ids: Vec<_> = order.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["b", "a", "c", "unrolled"]);
        assert!(order[0].active);
        assert!(!order[1].active);
    }

    #[tokio::test]
    async fn npc_status_carries_resources_and_conditions() {
        let mut npc = goblin("gob-1");
        npc.conditions = vec!["frightened".into()];
        npc.resources.legendary_actions = Some(tactician_domain::ResourcePool { value: 2, max: 3 });
        let encounter = Encounter {
            round: 1,
            active_combatant: Some(npc.id.clone()),
            grid_size: 100.0,
            combatants: vec![npc.clone(), fighter("pc-1")],
            action_log: vec![],
        };
        let cache = ActionDescriptionCache::new(
            Arc::new(ScriptedLlm::replying("[]")),
            manual_clock(),
            Duration::from_secs(60),
        );

        let situation = CombatSituationAnalyzer::new(Arc::new(cache), 5)
            .analyze(&encounter, &npc)
            .await;

        assert_eq!(situation.npc.conditions, vec!["frightened".to_string()]);
        assert_eq!(situation.npc.resources.legendary_actions.unwrap().value, 2);
        assert_eq!(situation.npc.vitals.armor_class, 15);
    }
}
