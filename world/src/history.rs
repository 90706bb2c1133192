//! Append-only ledger of resolved actions.

use std::collections::BTreeMap;

use outpost_core::Action;
use serde::{Deserialize, Serialize};

/// Actions recorded per turn, successes and failures alike.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    turns: BTreeMap<u32, Vec<Action>>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions recorded for `turn`; empty when nothing was recorded.
    #[must_use]
    pub fn actions(&self, turn: u32) -> &[Action] {
        self.turns.get(&turn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Reports whether an entry exists for `turn`.
    #[must_use]
    pub fn contains(&self, turn: u32) -> bool {
        self.turns.contains_key(&turn)
    }

    /// Latest recorded turn.
    #[must_use]
    pub fn last_turn(&self) -> Option<u32> {
        self.turns.keys().next_back().copied()
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Reports whether no turn has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Recorded turns in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Action])> + '_ {
        self.turns
            .iter()
            .map(|(turn, actions)| (*turn, actions.as_slice()))
    }

    pub(crate) fn record(&mut self, turn: u32, actions: Vec<Action>) {
        let _ = self.turns.insert(turn, actions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{ActionError, CommandType, EntityId};

    #[test]
    fn unknown_turn_has_no_actions() {
        let history = History::new();
        assert!(history.actions(3).is_empty());
        assert!(!history.contains(3));
        assert_eq!(history.last_turn(), None);
    }

    #[test]
    fn record_keeps_turns_ordered() {
        let mut history = History::new();
        let failure = Action::failed(
            EntityId::new(2),
            CommandType::Move,
            ActionError::Immobile(EntityId::new(2)),
        );
        history.record(2, vec![failure.clone()]);
        history.record(1, Vec::new());

        let turns: Vec<u32> = history.iter().map(|(turn, _)| turn).collect();
        assert_eq!(turns, vec![1, 2]);
        assert_eq!(history.actions(2), &[failure]);
        assert_eq!(history.last_turn(), Some(2));
        assert_eq!(history.len(), 2);
    }
}
