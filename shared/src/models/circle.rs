//! Livestock circle models

use serde::{Deserialize, Serialize};

/// Lifecycle status of a livestock circle (one cohort of animals)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircleStatus {
    Pending,
    Growing,
    Done,
    Cancelled,
}

impl CircleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircleStatus::Pending => "pending",
            CircleStatus::Growing => "growing",
            CircleStatus::Done => "done",
            CircleStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CircleStatus::Pending),
            "growing" => Some(CircleStatus::Growing),
            "done" => Some(CircleStatus::Done),
            "cancelled" => Some(CircleStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, CircleStatus::Done | CircleStatus::Cancelled)
    }

    /// Pending -> Growing -> Done, and any non-terminal status may be cancelled
    pub fn can_transition_to(&self, next: CircleStatus) -> bool {
        match (self, next) {
            (CircleStatus::Pending, CircleStatus::Growing) => true,
            (CircleStatus::Growing, CircleStatus::Done) => true,
            (from, CircleStatus::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl Default for CircleStatus {
    fn default() -> Self {
        CircleStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CircleStatus::Pending.can_transition_to(CircleStatus::Growing));
        assert!(CircleStatus::Growing.can_transition_to(CircleStatus::Done));
    }

    #[test]
    fn test_skipping_and_backward_transitions_rejected() {
        assert!(!CircleStatus::Pending.can_transition_to(CircleStatus::Done));
        assert!(!CircleStatus::Growing.can_transition_to(CircleStatus::Pending));
        assert!(!CircleStatus::Done.can_transition_to(CircleStatus::Growing));
    }

    #[test]
    fn test_cancel_only_from_non_terminal() {
        assert!(CircleStatus::Pending.can_transition_to(CircleStatus::Cancelled));
        assert!(CircleStatus::Growing.can_transition_to(CircleStatus::Cancelled));
        assert!(!CircleStatus::Done.can_transition_to(CircleStatus::Cancelled));
        assert!(!CircleStatus::Cancelled.can_transition_to(CircleStatus::Cancelled));
    }

    #[test]
    fn test_status_strings() {
        for status in [
            CircleStatus::Pending,
            CircleStatus::Growing,
            CircleStatus::Done,
            CircleStatus::Cancelled,
        ] {
            assert_eq!(CircleStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(CircleStatus::from_str("sold"), None);
    }
}
