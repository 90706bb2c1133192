//! Board entities stored in the game's id-keyed arena.

use outpost_core::{EntityId, Footprint, Position, TeamId, UnitKind, UnitStats};

/// Static, permanently blocking obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wall {
    id: EntityId,
    position: Position,
}

impl Wall {
    pub(crate) const fn new(id: EntityId, position: Position) -> Self {
        Self { id, position }
    }

    /// Identifier of the wall.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Cell the wall occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Food item, either lying loose on the board or carried by a citizen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    id: EntityId,
    position: Position,
    eaten_by: Option<EntityId>,
}

impl Food {
    pub(crate) const fn new(id: EntityId, position: Position) -> Self {
        Self {
            id,
            position,
            eaten_by: None,
        }
    }

    /// Identifier of the food item.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Cell the food lies on, or the carrier's cell while carried.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Unit currently carrying the food.
    #[must_use]
    pub const fn eaten_by(&self) -> Option<EntityId> {
        self.eaten_by
    }

    /// Reports whether the food lies on the ground.
    #[must_use]
    pub const fn is_loose(&self) -> bool {
        self.eaten_by.is_none()
    }

    pub(crate) fn attach(&mut self, carrier: EntityId, position: Position) {
        self.eaten_by = Some(carrier);
        self.position = position;
    }

    pub(crate) fn release(&mut self, position: Position) {
        self.eaten_by = None;
        self.position = position;
    }

    pub(crate) fn follow(&mut self, position: Position) {
        self.position = position;
    }
}

/// Team-affiliated, hp-bearing board entity.
///
/// Behaviour that differs between citizens, fighters and headquarters is
/// driven by [`UnitKind`] together with the owning team's settings table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unit {
    id: EntityId,
    team: TeamId,
    kind: UnitKind,
    stats: UnitStats,
    hp: i64,
    position: Position,
    carrying: Option<EntityId>,
}

impl Unit {
    /// Fresh unit at full health.
    pub(crate) fn new(
        id: EntityId,
        team: TeamId,
        kind: UnitKind,
        stats: UnitStats,
        position: Position,
    ) -> Self {
        Self {
            id,
            team,
            kind,
            stats,
            hp: i64::from(stats.hp),
            position,
            carrying: None,
        }
    }

    pub(crate) fn with_hp(mut self, hp: i64) -> Self {
        self.hp = hp;
        self
    }

    /// Identifier of the unit.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Team the unit fights for.
    #[must_use]
    pub const fn team(&self) -> TeamId {
        self.team
    }

    /// Kind of the unit.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Constants copied from the team's settings when the unit was created.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hp(&self) -> i64 {
        self.hp
    }

    /// Anchor cell of the unit's footprint.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Food carried by the unit.
    #[must_use]
    pub const fn carrying(&self) -> Option<EntityId> {
        self.carrying
    }

    /// Reports whether the unit still has hit points left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Reports whether the unit is a citizen.
    #[must_use]
    pub const fn is_citizen(&self) -> bool {
        matches!(self.kind, UnitKind::Citizen)
    }

    /// Reports whether the unit is a fighter.
    #[must_use]
    pub const fn is_fighter(&self) -> bool {
        matches!(self.kind, UnitKind::Fighter(_))
    }

    /// Reports whether the unit is a headquarters.
    #[must_use]
    pub const fn is_headquarters(&self) -> bool {
        matches!(self.kind, UnitKind::Headquarters)
    }

    /// Footprint of the unit.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.kind.footprint()
    }

    /// Cells covered by the unit.
    #[must_use]
    pub fn covering(&self) -> Vec<Position> {
        self.footprint().covering(self.position)
    }

    /// Smallest Manhattan distance between the two units' footprints.
    #[must_use]
    pub fn distance_to(&self, other: &Unit) -> u32 {
        self.covering()
            .into_iter()
            .map(|cell| other.footprint().distance_to(other.position, cell))
            .min()
            .unwrap_or(u32::MAX)
    }

    /// Damage this unit deals to `target` with a single attack.
    #[must_use]
    pub fn damage_against(&self, target: &Unit) -> u32 {
        if self.kind.has_bonus_against(target.kind) {
            self.stats.attack.saturating_add(self.stats.counter_bonus)
        } else {
            self.stats.attack
        }
    }

    /// Lowers hp by `amount` and reports whether the unit is now dead.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        self.hp -= i64::from(amount);
        !self.is_alive()
    }

    pub(crate) fn relocate(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_carrying(&mut self, food: Option<EntityId>) {
        self.carrying = food;
    }
}

/// Any addressable board entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A wall.
    Wall(Wall),
    /// A food item.
    Food(Food),
    /// A citizen, fighter or headquarters.
    Unit(Unit),
}

impl Entity {
    /// Identifier of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::Wall(wall) => wall.id(),
            Self::Food(food) => food.id(),
            Self::Unit(unit) => unit.id(),
        }
    }

    /// Anchor cell of the entity.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Wall(wall) => wall.position(),
            Self::Food(food) => food.position(),
            Self::Unit(unit) => unit.position(),
        }
    }

    /// The unit, when the entity is one.
    #[must_use]
    pub const fn as_unit(&self) -> Option<&Unit> {
        match self {
            Self::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// The food item, when the entity is one.
    #[must_use]
    pub const fn as_food(&self) -> Option<&Food> {
        match self {
            Self::Food(food) => Some(food),
            _ => None,
        }
    }

    pub(crate) fn as_unit_mut(&mut self) -> Option<&mut Unit> {
        match self {
            Self::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub(crate) fn as_food_mut(&mut self) -> Option<&mut Food> {
        match self {
            Self::Food(food) => Some(food),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{FighterKind, UnitSettings};

    fn unit(id: u32, team: u8, kind: UnitKind, position: Position) -> Unit {
        Unit::new(
            EntityId::new(id),
            TeamId::new(team),
            kind,
            *UnitSettings::default().stats(kind),
            position,
        )
    }

    #[test]
    fn take_damage_reports_death_at_zero() {
        let mut unit = unit(1, 1, UnitKind::Citizen, Position::new(0, 0));
        assert_eq!(unit.hp(), 20);

        assert!(!unit.take_damage(19));
        assert_eq!(unit.hp(), 1);
        assert!(unit.take_damage(1));
        assert!(!unit.is_alive());
    }

    #[test]
    fn footprint_distance_accounts_for_headquarters_size() {
        let headquarters = unit(1, 1, UnitKind::Headquarters, Position::new(2, 2));
        let ranged = unit(
            2,
            2,
            UnitKind::Fighter(FighterKind::Ranged),
            Position::new(6, 3),
        );

        assert_eq!(headquarters.distance_to(&ranged), 3);
        assert_eq!(ranged.distance_to(&headquarters), 3);
        assert_eq!(headquarters.covering().len(), 4);
    }

    #[test]
    fn counter_bonus_applies_to_countered_fighter_only() {
        let infantry = unit(1, 1, UnitKind::Fighter(FighterKind::Infantry), Position::new(0, 0));
        let cavalry = unit(2, 2, UnitKind::Fighter(FighterKind::Cavalry), Position::new(1, 0));
        let ranged = unit(3, 2, UnitKind::Fighter(FighterKind::Ranged), Position::new(0, 1));
        let citizen = unit(4, 2, UnitKind::Citizen, Position::new(0, 2));

        assert_eq!(infantry.damage_against(&cavalry), 20);
        assert_eq!(infantry.damage_against(&ranged), 10);
        assert_eq!(infantry.damage_against(&citizen), 10);
        assert_eq!(ranged.damage_against(&infantry), 16);
        assert_eq!(cavalry.damage_against(&ranged), 24);
        assert_eq!(citizen.damage_against(&infantry), 2);
    }

    #[test]
    fn restored_units_keep_their_hp() {
        let restored = unit(1, 1, UnitKind::Citizen, Position::new(0, 0)).with_hp(7);
        assert_eq!(restored.hp(), 7);
        assert_eq!(restored.stats().hp, 20);
    }

    #[test]
    fn food_tracks_its_carrier() {
        let mut food = Food::new(EntityId::new(9), Position::new(1, 1));
        assert!(food.is_loose());

        food.attach(EntityId::new(4), Position::new(1, 2));
        food.follow(Position::new(1, 3));
        assert_eq!(food.eaten_by(), Some(EntityId::new(4)));
        assert_eq!(food.position(), Position::new(1, 3));

        food.release(Position::new(2, 3));
        assert!(food.is_loose());
    }
}
