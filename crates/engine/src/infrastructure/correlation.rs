//! Per-turn correlation ids for log tracing.

use std::fmt;
use uuid::Uuid;

/// Identifies one handled NPC turn across every log line it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(Uuid);

impl TurnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short format (first 8 characters) for logging.
    pub fn short(&self) -> String {
        let full = self.0.simple().to_string();
        full[..8].to_string()
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(TurnId::new(), TurnId::new());
    }

    #[test]
    fn short_format_is_8_chars() {
        assert_eq!(TurnId::new().short().len(), 8);
    }
}
