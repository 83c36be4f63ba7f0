//! Prompt for per-turn tactical recommendations.

use std::collections::BTreeMap;

use tactician_domain::{ActivationCategory, Difficulty, FinalAction};

use crate::use_cases::combat::{CombatSituation, CombatantSummary};

pub const RECOMMENDATION_SYSTEM_PROMPT: &str = "You are a tactical advisor for a game master \
running monsters and NPCs in a tabletop RPG combat. You answer with a single JSON object.";

/// Options every creature has on its turn, whatever its sheet lists.
const STANDARD_ACTIONS: [(&str, &str); 7] = [
    ("Attack", "Make a weapon or spell attack"),
    ("Dash", "Move up to your speed"),
    ("Dodge", "Focus on avoiding attacks"),
    ("Help", "Give an ally advantage on their next check"),
    ("Hide", "Make a Stealth check"),
    ("Ready", "Prepare an action for a specific trigger"),
    ("Search", "Look for something"),
];

/// Behavioral directive for each difficulty tier.
pub fn difficulty_directive(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Play cautiously and sub-optimally. Favor defensive or showy options, spread attacks \
             around, never focus a downed or nearly-dead character, and retreat when hurt."
        }
        Difficulty::Normal => {
            "Play sensibly, as a typical creature of this kind would. Use obvious good options but \
             do not coordinate perfectly or exploit every weakness."
        }
        Difficulty::Hard => {
            "Play smart. Focus the most threatening or exposed enemy, use terrain and positioning, \
             and spend limited resources when they matter."
        }
        Difficulty::Deadly => {
            "Play optimally. Coordinate with allies, focus fire to drop enemies, target weak \
             saving throws, and spend resources aggressively."
        }
        Difficulty::Tpk => {
            "Play to win at all costs. Use meta-knowledge and perfect tactics: eliminate healers \
             and spellcasters first, finish off downed characters, deny escape, and spend every \
             resource for maximum lethality."
        }
    }
}

pub fn build_recommendation_prompt(
    situation: &CombatSituation,
    difficulty: Difficulty,
    grouped: &BTreeMap<ActivationCategory, Vec<FinalAction>>,
    count: usize,
) -> String {
    let npc = &situation.npc;
    let mut p = format!(
        "Round {}. It is {}'s turn.\n\n## {}\nHP {}/{} ({}%), AC {}, speed {} ft\n",
        situation.round,
        npc.name,
        npc.name,
        npc.vitals.hp,
        npc.vitals.hp_max,
        npc.vitals.hp_percent(),
        npc.vitals.armor_class,
        npc.vitals.speed
    );
    if !npc.conditions.is_empty() {
        p.push_str(&format!("Conditions: {}\n", npc.conditions.join(", ")));
    }
    write_resources(&mut p, situation);

    p.push_str("\n## Available actions\n");
    if grouped.is_empty() {
        p.push_str("(none listed; improvise with the standard options)\n");
    }
    for (category, actions) in grouped {
        p.push_str(&format!("### {} [{}]\n", category.label(), category.as_str()));
        for action in actions {
            p.push_str(&format!("- {}: {}\n", action.name, action.description));
        }
    }
    p.push_str("### Standard actions [action]\n");
    for (name, description) in STANDARD_ACTIONS {
        p.push_str(&format!("- {}: {}\n", name, description));
    }

    p.push_str("\n## Initiative order\n");
    for entry in &situation.initiative_order {
        let roll = entry
            .initiative
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        p.push_str(&format!("- {} ({})", entry.name, roll));
        if entry.active {
            p.push_str(" <- current turn");
        }
        if entry.defeated {
            p.push_str(" [defeated]");
        }
        p.push('\n');
    }

    write_others(&mut p, "Enemies", &situation.enemies);
    write_others(&mut p, "Allies", &situation.allies);

    if !situation.recent_actions.is_empty() {
        p.push_str("\n## Recent actions\n");
        for entry in &situation.recent_actions {
            p.push_str(&format!("- {}\n", entry));
        }
    }

    p.push_str(&format!(
        "\n## Difficulty: {}\n{}\n\n",
        difficulty,
        difficulty_directive(difficulty)
    ));

    let categories = if grouped.is_empty() {
        "\"action\"".to_string()
    } else {
        grouped
            .keys()
            .map(|c| format!("\"{}\"", c.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    p.push_str(&format!(
        r#"Respond with a JSON object keyed by activation category ({categories}).
Each value is a list of up to {count} recommendations ordered by priority:
{{"action": [{{"action": "<action name>", "reasoning": "<one sentence>", "priority": 1}}]}}
Only recommend actions listed above. Respond with the JSON object only."#,
        categories = categories,
        count = count,
    ));

    p
}

fn write_resources(p: &mut String, situation: &CombatSituation) {
    let resources = &situation.npc.resources;
    if !resources.spell_slots.is_empty() {
        let slots = resources
            .spell_slots
            .iter()
            .map(|(level, pool)| format!("L{} {}/{}", level, pool.value, pool.max))
            .collect::<Vec<_>>()
            .join(", ");
        p.push_str(&format!("Spell slots: {}\n", slots));
    }
    if let Some(pool) = resources.legendary_actions {
        p.push_str(&format!("Legendary actions: {}/{}\n", pool.value, pool.max));
    }
    if let Some(pool) = resources.legendary_resistances {
        p.push_str(&format!("Legendary resistances: {}/{}\n", pool.value, pool.max));
    }
}

fn write_others(p: &mut String, heading: &str, others: &[CombatantSummary]) {
    p.push_str(&format!("\n## {}\n", heading));
    if others.is_empty() {
        p.push_str("(none)\n");
        return;
    }
    for other in others {
        p.push_str(&format!(
            "- {}: {} ft away, HP {}/{} ({}%), AC {}",
            other.name,
            other.distance_feet,
            other.hp,
            other.hp_max,
            other.hp_percent,
            other.armor_class
        ));
        if !other.conditions.is_empty() {
            p.push_str(&format!(", {}", other.conditions.join(", ")));
        }
        p.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::combat::{InitiativeEntry, NpcStatus};
    use tactician_domain::{
        group_by_category, ActivationTime, CombatantId, Position, ResourcePool, Resources, Vitals,
    };

    fn situation() -> CombatSituation {
        let mut resources = Resources::default();
        resources.spell_slots.insert(1, ResourcePool { value: 2, max: 4 });

        CombatSituation {
            round: 3,
            npc: NpcStatus {
                id: CombatantId::new("mage"),
                name: "Cult Fanatic".into(),
                vitals: Vitals {
                    hp: 20,
                    hp_max: 33,
                    armor_class: 13,
                    speed: 30,
                },
                position: Position::default(),
                conditions: vec!["poisoned".into()],
                resources,
            },
            initiative_order: vec![
                InitiativeEntry {
                    id: CombatantId::new("mage"),
                    name: "Cult Fanatic".into(),
                    initiative: Some(17.0),
                    player_controlled: false,
                    defeated: false,
                    active: true,
                },
                InitiativeEntry {
                    id: CombatantId::new("pc"),
                    name: "Cleric".into(),
                    initiative: Some(9.0),
                    player_controlled: true,
                    defeated: false,
                    active: false,
                },
            ],
            actions: vec![
                FinalAction {
                    name: "Inflict Wounds".into(),
                    description: "Melee spell, 3d10 necrotic".into(),
                    activation_time: ActivationTime::Action,
                    item_type: "spell".into(),
                },
                FinalAction {
                    name: "Spiritual Weapon".into(),
                    description: "Bonus action spectral weapon, 1d8+2 force".into(),
                    activation_time: ActivationTime::Bonus,
                    item_type: "spell".into(),
                },
            ],
            enemies: vec![CombatantSummary {
                id: CombatantId::new("pc"),
                name: "Cleric".into(),
                distance_feet: 10,
                hp: 8,
                hp_max: 27,
                hp_percent: 30,
                armor_class: 18,
                conditions: vec![],
            }],
            allies: vec![],
            recent_actions: vec!["Cleric casts Bless".into()],
        }
    }

    #[test]
    fn embeds_the_whole_situation() {
        let s = situation();
        let grouped = group_by_category(&s.actions);

        let prompt = build_recommendation_prompt(&s, Difficulty::Hard, &grouped, 3);

        assert!(prompt.contains("Round 3. It is Cult Fanatic's turn."));
        assert!(prompt.contains("HP 20/33 (61%), AC 13, speed 30 ft"));
        assert!(prompt.contains("Conditions: poisoned"));
        assert!(prompt.contains("Spell slots: L1 2/4"));
        assert!(prompt.contains("### Bonus Actions [bonus]"));
        assert!(prompt.contains("- Inflict Wounds: Melee spell, 3d10 necrotic"));
        assert!(prompt.contains("- Cult Fanatic (17) <- current turn"));
        assert!(prompt.contains("- Cleric: 10 ft away, HP 8/27 (30%), AC 18"));
        assert!(prompt.contains("## Allies\n(none)"));
        assert!(prompt.contains("- Cleric casts Bless"));
        assert!(prompt.contains(difficulty_directive(Difficulty::Hard)));
        assert!(prompt.contains("keyed by activation category (\"action\", \"bonus\")"));
        assert!(prompt.contains("up to 3 recommendations"));
        assert!(prompt.contains("### Standard actions [action]\n- Attack: Make a weapon or spell attack"));
        assert!(prompt.contains("- Search: Look for something"));
    }

    #[test]
    fn no_listed_actions_still_asks_for_the_action_category() {
        let mut s = situation();
        s.actions.clear();

        let prompt = build_recommendation_prompt(&s, Difficulty::Tpk, &BTreeMap::new(), 2);

        assert!(prompt.contains("(none listed; improvise with the standard options)"));
        assert!(prompt.contains("- Dodge: Focus on avoiding attacks"));
        assert!(prompt.contains("## Difficulty: tpk"));
        assert!(prompt.contains("keyed by activation category (\"action\")"));
    }

    #[test]
    fn every_tier_has_a_distinct_directive() {
        let mut directives: Vec<_> = Difficulty::ALL.iter().map(|d| difficulty_directive(*d)).collect();
        directives.dedup();
        assert_eq!(directives.len(), 5);
    }
}
