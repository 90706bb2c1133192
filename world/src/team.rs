//! Team records: stockpile, headquarters reference and unit settings.

use outpost_core::{EntityId, Position, TeamId, UnitKind, UnitSettings};

/// One side of the battle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    id: TeamId,
    color: String,
    food_count: u32,
    headquarters: EntityId,
    headquarters_position: Position,
    settings: UnitSettings,
}

impl Team {
    pub(crate) fn new(
        id: TeamId,
        color: String,
        food_count: u32,
        headquarters: EntityId,
        headquarters_position: Position,
        settings: UnitSettings,
    ) -> Self {
        Self {
            id,
            color,
            food_count,
            headquarters,
            headquarters_position,
            settings,
        }
    }

    /// Identifier of the team.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Display colour of the team.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Food available for spawning.
    #[must_use]
    pub const fn food_count(&self) -> u32 {
        self.food_count
    }

    /// Identifier of the team's headquarters.
    #[must_use]
    pub const fn headquarters(&self) -> EntityId {
        self.headquarters
    }

    /// Anchor cell of the team's headquarters.
    #[must_use]
    pub const fn headquarters_position(&self) -> Position {
        self.headquarters_position
    }

    /// Cells covered by the team's headquarters.
    #[must_use]
    pub fn headquarters_cells(&self) -> Vec<Position> {
        UnitKind::Headquarters
            .footprint()
            .covering(self.headquarters_position)
    }

    /// Per-kind unit constants used by this team.
    #[must_use]
    pub const fn settings(&self) -> &UnitSettings {
        &self.settings
    }

    pub(crate) fn credit_food(&mut self, amount: u32) {
        self.food_count = self.food_count.saturating_add(amount);
    }

    pub(crate) fn debit_food(&mut self, amount: u32) {
        self.food_count = self.food_count.saturating_sub(amount);
    }
}
