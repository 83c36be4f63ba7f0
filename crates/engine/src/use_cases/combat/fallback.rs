//! Static recommendations used when generation fails.

use std::collections::BTreeMap;

use tactician_domain::{
    ActivationCategory, Difficulty, FinalAction, Recommendation, RecommendationSet,
    DEFAULT_CATEGORY,
};

/// Canned main-action plan for each tier, best first.
fn tier_moves(difficulty: Difficulty) -> &'static [(&'static str, &'static str)] {
    match difficulty {
        Difficulty::Easy => &[
            ("Move and Attack", "Simple melee attack"),
            ("Dodge", "Defensive action"),
            ("Dash", "Reposition safely"),
        ],
        Difficulty::Normal => &[
            ("Attack strongest enemy", "Focus fire on threats"),
            ("Use class feature", "Utilize special abilities"),
            ("Tactical movement", "Improve positioning"),
        ],
        Difficulty::Hard => &[
            ("Multi-attack on weakest", "Eliminate low HP targets"),
            ("Use powerful ability", "Maximize damage potential"),
            ("Control battlefield", "Use terrain and positioning"),
        ],
        Difficulty::Deadly => &[
            ("Focus fire spellcaster", "Eliminate primary threats"),
            ("Use legendary action", "Maximize action economy"),
            ("Coordinate with allies", "Tactical team play"),
        ],
        Difficulty::Tpk => &[
            ("Target unconscious PCs", "Force death saves"),
            ("Use environment", "Maximize all advantages"),
            ("Perfect positioning", "Optimal tactical placement"),
        ],
    }
}

fn reasoning(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Offline suggestion: a cautious, low-risk option.",
        Difficulty::Normal => "Offline suggestion: a sensible default.",
        Difficulty::Hard => "Offline suggestion: use it on the most exposed enemy.",
        Difficulty::Deadly => "Offline suggestion: focus it on the weakest enemy with your allies.",
        Difficulty::Tpk => "Offline suggestion: use it to finish off the most wounded enemy.",
    }
}

/// Recommendation set built without the generator, keyed like a generated one.
///
/// The `action` category always carries the tier's canned plan. Other
/// categories list the combatant's own abilities, first `count` in order.
pub fn fallback_recommendations(
    difficulty: Difficulty,
    grouped: &BTreeMap<ActivationCategory, Vec<FinalAction>>,
    count: usize,
) -> RecommendationSet {
    let plan = tier_moves(difficulty)
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, (action, why))| Recommendation::new(*action, *why, i as u32 + 1))
        .collect();
    let mut set = RecommendationSet::single(DEFAULT_CATEGORY, plan);

    for (category, actions) in grouped {
        if *category == ActivationCategory::Action {
            continue;
        }
        let picks: Vec<Recommendation> = actions
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, a)| Recommendation::new(&a.name, reasoning(difficulty), i as u32 + 1))
            .collect();
        if !picks.is_empty() {
            set.insert(category.as_str(), picks);
        }
    }
    set
}
