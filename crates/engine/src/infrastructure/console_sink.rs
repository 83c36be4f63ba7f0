//! Terminal display for recommendations.

use std::io::Write as _;

use async_trait::async_trait;
use tactician_domain::{Combatant, RecommendationSet};

use crate::infrastructure::ports::RecommendationSink;

/// Prints recommendations, grouped by category, to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecommendationSink for ConsoleSink {
    async fn present(&self, combatant: &Combatant, recommendations: &RecommendationSet) {
        let text = render(combatant, recommendations);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
            tracing::warn!(error = %e, "Failed to write recommendations to stdout");
        }
    }

    async fn notify_failure(&self, message: &str) {
        tracing::error!("{}", message);
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = writeln!(stderr, "Tactician: {}", message) {
            tracing::warn!(error = %e, "Failed to write failure notice to stderr");
        }
    }
}

pub(crate) fn render(combatant: &Combatant, recommendations: &RecommendationSet) -> String {
    let mut out = format!("=== {} ===\n", combatant.name);

    if recommendations.is_empty() {
        out.push_str("  (no recommendations)\n");
        return out;
    }

    for (category, entries) in recommendations.iter() {
        out.push_str(&format!("[{}]\n", category));
        let mut sorted = entries.to_vec();
        sorted.sort_by_key(|r| r.priority);
        for rec in sorted {
            out.push_str(&format!("  {}. {}\n", rec.priority, rec.action));
            if !rec.reasoning.is_empty() {
                out.push_str(&format!("     {}\n", rec.reasoning));
            }
        }
    }
    out
}
