//! Warm the action cache for every NPC when combat begins.

use futures_util::future::join_all;
use tactician_domain::Encounter;

use crate::use_cases::actions::ActionDescriptionCache;

/// Generate descriptions for every living NPC concurrently.
///
/// Returns how many NPCs ended up with at least one action.
pub async fn precache_encounter(cache: &ActionDescriptionCache, encounter: &Encounter) -> usize {
    let lookups = encounter.active_npcs().map(|npc| async move {
        let actions = cache.get_actions(&npc.id, &npc.name, &npc.items).await;
        !actions.is_empty()
    });

    let results = join_all(lookups).await;
    let npcs = results.len();
    let described = results.into_iter().filter(|has_actions| *has_actions).count();

    tracing::info!(npcs, described, "Pre-cached NPC actions");
    described
}
