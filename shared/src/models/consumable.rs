//! Consumable item kinds tracked by circle stock ledgers

use serde::{Deserialize, Serialize};

/// Kind of item a circle consumes from its stock ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableKind {
    Food,
    Medicine,
}

impl ConsumableKind {
    pub const ALL: [ConsumableKind; 2] = [ConsumableKind::Food, ConsumableKind::Medicine];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumableKind::Food => "food",
            ConsumableKind::Medicine => "medicine",
        }
    }

    /// Human readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            ConsumableKind::Food => "Food",
            ConsumableKind::Medicine => "Medicine",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "food" | "foods" => Some(ConsumableKind::Food),
            "medicine" | "medicines" => Some(ConsumableKind::Medicine),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConsumableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ConsumableKind::ALL {
            assert_eq!(ConsumableKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_accepts_plural_route_segments() {
        assert_eq!(ConsumableKind::from_str("foods"), Some(ConsumableKind::Food));
        assert_eq!(ConsumableKind::from_str("medicines"), Some(ConsumableKind::Medicine));
        assert_eq!(ConsumableKind::from_str("vaccine"), None);
    }
}
