#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Outpost engine.
//!
//! This crate defines the message surface between command producers, the
//! authoritative game, and replicas. Producers submit [`Command`] values
//! describing intents for individual units, the game validates and resolves
//! them into [`Action`] values, and replicas consume those actions to stay in
//! lock-step without re-running validation.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

/// Unique identifier assigned to every addressable entity on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of one of the two competing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(u8);

impl TeamId {
    /// Creates a new team identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the team identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.0)
    }
}

/// Location of a single board cell.
///
/// Coordinates are signed so that neighbour arithmetic never wraps; bounds
/// are enforced by the board, not by the position itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new board position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Canonical string key of the position, formatted as `"x,y"`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Returns the position shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the two positions share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The four orthogonal neighbours, ordered north, east, south, west.
    #[must_use]
    pub const fn adjacents(self) -> [Position; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }

    /// Every cell within `distance` orthogonal steps, excluding the origin.
    ///
    /// Cells are produced ring by ring in expansion order: each ring lists the
    /// newly discovered neighbours of the previous ring, in [`Self::adjacents`]
    /// order, without duplicates.
    #[must_use]
    pub fn adjacents_within_distance(self, distance: u32) -> Vec<Position> {
        let mut seen = HashSet::new();
        let _ = seen.insert(self);
        let mut frontier = vec![self];
        let mut cells = Vec::new();

        for _ in 0..distance {
            let mut next = Vec::new();
            for cell in &frontier {
                for neighbor in cell.adjacents() {
                    if seen.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            cells.extend_from_slice(&next);
            frontier = next;
        }

        cells
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangular set of cells occupied by an entity, anchored at its top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    width: u32,
    height: u32,
}

impl Footprint {
    /// Footprint covering a single cell.
    pub const SINGLE: Footprint = Footprint::new(1, 1);

    /// Creates a new footprint with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the footprint in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the footprint in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Enumerates the covered cells in row-major order starting at `anchor`.
    #[must_use]
    pub fn covering(self, anchor: Position) -> Vec<Position> {
        let mut cells = Vec::with_capacity((self.width * self.height) as usize);
        for dy in 0..self.height {
            for dx in 0..self.width {
                cells.push(anchor.offset(dx as i32, dy as i32));
            }
        }
        cells
    }

    /// Reports whether `cell` lies inside the footprint anchored at `anchor`.
    #[must_use]
    pub fn contains(self, anchor: Position, cell: Position) -> bool {
        let dx = i64::from(cell.x()) - i64::from(anchor.x());
        let dy = i64::from(cell.y()) - i64::from(anchor.y());
        dx >= 0 && dy >= 0 && dx < i64::from(self.width) && dy < i64::from(self.height)
    }

    /// Cells sharing an edge with the footprint but not covered by it.
    ///
    /// Ordered by walking the covered cells row-major and listing each cell's
    /// new neighbours in north, east, south, west order.
    #[must_use]
    pub fn ring(self, anchor: Position) -> Vec<Position> {
        let covered = self.covering(anchor);
        let mut ring = Vec::new();
        for cell in &covered {
            for neighbor in cell.adjacents() {
                if !covered.contains(&neighbor) && !ring.contains(&neighbor) {
                    ring.push(neighbor);
                }
            }
        }
        ring
    }

    /// Smallest Manhattan distance between `cell` and any covered cell.
    #[must_use]
    pub fn distance_to(self, anchor: Position, cell: Position) -> u32 {
        self.covering(anchor)
            .into_iter()
            .map(|covered| covered.manhattan_distance(cell))
            .min()
            .unwrap_or(u32::MAX)
    }
}

/// The three fighter archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FighterKind {
    /// Melee line unit; counters cavalry.
    Infantry,
    /// Long-range unit; counters infantry.
    Ranged,
    /// Fast mounted unit; counters ranged.
    Cavalry,
}

impl FighterKind {
    /// Every fighter kind in declaration order.
    pub const ALL: [FighterKind; 3] = [Self::Infantry, Self::Ranged, Self::Cavalry];

    /// The single fighter kind this kind deals bonus damage against.
    #[must_use]
    pub const fn counters(self) -> FighterKind {
        match self {
            Self::Infantry => Self::Cavalry,
            Self::Cavalry => Self::Ranged,
            Self::Ranged => Self::Infantry,
        }
    }
}

impl fmt::Display for FighterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Infantry => "infantry",
            Self::Ranged => "ranged",
            Self::Cavalry => "cavalry",
        };
        f.write_str(name)
    }
}

/// Kinds of hp-bearing, team-affiliated units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    /// Worker that gathers food.
    Citizen,
    /// Combat unit of the given archetype.
    Fighter(FighterKind),
    /// Immobile team base that spawns units and stores food.
    Headquarters,
}

impl UnitKind {
    /// Cells occupied by units of this kind.
    #[must_use]
    pub const fn footprint(self) -> Footprint {
        match self {
            Self::Headquarters => Footprint::new(2, 2),
            Self::Citizen | Self::Fighter(_) => Footprint::SINGLE,
        }
    }

    /// Reports whether the kind counts toward the population cap.
    #[must_use]
    pub const fn counts_toward_population(self) -> bool {
        !matches!(self, Self::Headquarters)
    }

    /// Reports whether this kind is the hard counter of `target`.
    #[must_use]
    pub fn has_bonus_against(self, target: UnitKind) -> bool {
        match (self, target) {
            (Self::Fighter(own), Self::Fighter(other)) => own.counters() == other,
            _ => false,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Citizen => f.write_str("citizen"),
            Self::Fighter(kind) => write!(f, "{kind}"),
            Self::Headquarters => f.write_str("headquarters"),
        }
    }
}

/// Constant parameters shared by every unit of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Hit points a freshly spawned unit starts with.
    pub hp: u32,
    /// Maximum number of orthogonal steps per move.
    pub speed: u32,
    /// Maximum footprint-to-footprint distance for attacks.
    pub range: u32,
    /// Damage dealt by a plain attack.
    pub attack: u32,
    /// Food deducted from the team when the unit is spawned.
    pub cost: u32,
    /// Extra damage dealt against the countered fighter kind.
    #[serde(default)]
    pub counter_bonus: u32,
}

/// Per-kind settings table carried by each team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSettings {
    /// Settings for citizens.
    pub citizen: UnitStats,
    /// Settings for infantry fighters.
    pub infantry: UnitStats,
    /// Settings for ranged fighters.
    pub ranged: UnitStats,
    /// Settings for cavalry fighters.
    pub cavalry: UnitStats,
    /// Settings for the headquarters.
    pub headquarters: UnitStats,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            citizen: UnitStats {
                hp: 20,
                speed: 1,
                range: 1,
                attack: 2,
                cost: 1,
                counter_bonus: 0,
            },
            infantry: UnitStats {
                hp: 60,
                speed: 1,
                range: 1,
                attack: 10,
                cost: 2,
                counter_bonus: 10,
            },
            ranged: UnitStats {
                hp: 40,
                speed: 1,
                range: 3,
                attack: 8,
                cost: 2,
                counter_bonus: 8,
            },
            cavalry: UnitStats {
                hp: 80,
                speed: 2,
                range: 1,
                attack: 12,
                cost: 3,
                counter_bonus: 12,
            },
            headquarters: UnitStats {
                hp: 500,
                speed: 0,
                range: 2,
                attack: 5,
                cost: 0,
                counter_bonus: 0,
            },
        }
    }
}

impl UnitSettings {
    /// Settings row for the provided unit kind.
    #[must_use]
    pub const fn stats(&self, kind: UnitKind) -> &UnitStats {
        match kind {
            UnitKind::Citizen => &self.citizen,
            UnitKind::Fighter(FighterKind::Infantry) => &self.infantry,
            UnitKind::Fighter(FighterKind::Ranged) => &self.ranged,
            UnitKind::Fighter(FighterKind::Cavalry) => &self.cavalry,
            UnitKind::Headquarters => &self.headquarters,
        }
    }

    /// Damage a unit of kind `attacker` deals to a unit of kind `target`.
    ///
    /// Fighters add their counter bonus against the one fighter kind they
    /// counter; every other pairing deals the attacker's base damage.
    #[must_use]
    pub fn damage_against(&self, attacker: UnitKind, target: UnitKind) -> u32 {
        let stats = self.stats(attacker);
        if attacker.has_bonus_against(target) {
            stats.attack.saturating_add(stats.counter_bonus)
        } else {
            stats.attack
        }
    }
}

/// Unvalidated intent submitted for one unit in a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Unit the command is issued to.
    pub unit: EntityId,
    /// Requested behaviour.
    pub kind: CommandKind,
}

impl Command {
    /// Creates a command for the provided unit.
    #[must_use]
    pub const fn new(unit: EntityId, kind: CommandKind) -> Self {
        Self { unit, kind }
    }

    /// Discriminator of the command kind.
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        self.kind.command_type()
    }
}

/// Payload of a [`Command`], tagged by `type` when serialised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandKind {
    /// Move the unit to a cell within its speed.
    #[serde(rename_all = "camelCase")]
    Move {
        /// Cell the unit should end the move on.
        destination: Position,
        /// Pick up loose food lying on the destination cell.
        #[serde(default)]
        auto_pick_up_food: bool,
        /// Deposit carried food when arriving next to the friendly headquarters.
        #[serde(default)]
        auto_drop_off_food: bool,
    },
    /// Attack another unit, closing the distance first if necessary.
    Attack {
        /// Unit under attack.
        target: EntityId,
    },
    /// Spawn a citizen next to the issuing headquarters.
    SpawnCitizen {
        /// Requested spawn cell; the next free cell is used when absent.
        #[serde(default)]
        position: Option<Position>,
    },
    /// Spawn a fighter next to the issuing headquarters.
    SpawnFighter {
        /// Archetype to spawn.
        kind: FighterKind,
        /// Requested spawn cell; the next free cell is used when absent.
        #[serde(default)]
        position: Option<Position>,
    },
    /// Pick up an adjacent loose food item.
    PickUpFood {
        /// Food item to pick up.
        food: EntityId,
    },
    /// Put carried food down on an adjacent cell.
    DropOffFood {
        /// Cell that receives the food.
        position: Position,
    },
}

impl CommandKind {
    /// Discriminator of the command kind.
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        match self {
            Self::Move { .. } => CommandType::Move,
            Self::Attack { .. } => CommandType::Attack,
            Self::SpawnCitizen { .. } => CommandType::SpawnCitizen,
            Self::SpawnFighter { .. } => CommandType::SpawnFighter,
            Self::PickUpFood { .. } => CommandType::PickUpFood,
            Self::DropOffFood { .. } => CommandType::DropOffFood,
        }
    }
}

/// Fieldless discriminator of [`CommandKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandType {
    /// See [`CommandKind::Move`].
    Move,
    /// See [`CommandKind::Attack`].
    Attack,
    /// See [`CommandKind::SpawnCitizen`].
    SpawnCitizen,
    /// See [`CommandKind::SpawnFighter`].
    SpawnFighter,
    /// See [`CommandKind::PickUpFood`].
    PickUpFood,
    /// See [`CommandKind::DropOffFood`].
    DropOffFood,
}

impl CommandType {
    /// Turn phase in which commands of this type are resolved.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Attack => Phase::Attack,
            Self::PickUpFood => Phase::PickUp,
            Self::DropOffFood => Phase::DropOff,
            Self::Move => Phase::Move,
            Self::SpawnCitizen | Self::SpawnFighter => Phase::Spawn,
        }
    }
}

/// The five fixed turn stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Attacks, including attack commands down-converted into moves.
    Attack,
    /// Food pick-ups.
    PickUp,
    /// Food drop-offs.
    DropOff,
    /// Moves.
    Move,
    /// Unit spawns.
    Spawn,
}

impl Phase {
    /// Resolution order of the phases within a turn.
    pub const ORDER: [Phase; 5] = [
        Self::Attack,
        Self::PickUp,
        Self::DropOff,
        Self::Move,
        Self::Spawn,
    ];

    /// Zero-based position of the phase in [`Self::ORDER`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Attack => 0,
            Self::PickUp => 1,
            Self::DropOff => 2,
            Self::Move => 3,
            Self::Spawn => 4,
        }
    }
}

/// Validated outcome of a [`Command`], permanently recorded in history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Unit the originating command was issued to.
    pub unit: EntityId,
    /// Result of validating and executing the command.
    pub outcome: Outcome,
}

impl Action {
    /// Creates a successful action carrying the applied effect.
    #[must_use]
    pub const fn succeeded(unit: EntityId, effect: Effect) -> Self {
        Self {
            unit,
            outcome: Outcome::Succeeded { effect },
        }
    }

    /// Creates a failed action for a command that did not pass validation.
    #[must_use]
    pub const fn failed(unit: EntityId, command: CommandType, error: ActionError) -> Self {
        Self {
            unit,
            outcome: Outcome::Failed { command, error },
        }
    }

    /// Reports whether the action mutated game state.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded { .. })
    }

    /// Effect applied by a successful action.
    #[must_use]
    pub const fn effect(&self) -> Option<&Effect> {
        match &self.outcome {
            Outcome::Succeeded { effect } => Some(effect),
            Outcome::Failed { .. } => None,
        }
    }

    /// Error recorded by a failed action.
    #[must_use]
    pub const fn error(&self) -> Option<&ActionError> {
        match &self.outcome {
            Outcome::Succeeded { .. } => None,
            Outcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Success or failure of an [`Action`], tagged by `status` when serialised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    /// The command passed validation and its effect was applied.
    Succeeded {
        /// Mutation applied to the game.
        effect: Effect,
    },
    /// The command failed validation; no state changed.
    Failed {
        /// Type of the rejected command.
        command: CommandType,
        /// Reason the command was rejected.
        error: ActionError,
    },
}

/// Fully resolved mutation recorded by a successful action.
///
/// Effects carry every value a replica needs to reproduce the mutation
/// without consulting its own state for decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    /// Damage dealt to a target unit.
    Attack {
        /// Unit that received the damage.
        target: EntityId,
        /// Hit points removed.
        damage: u32,
        /// Whether the target's hp dropped to zero or below.
        destroyed: bool,
    },
    /// Unit relocation, including attack commands converted into moves.
    #[serde(rename_all = "camelCase")]
    Move {
        /// Cell the unit left.
        from: Position,
        /// Cell the unit arrived on.
        to: Position,
        /// Food picked up on arrival.
        #[serde(default)]
        picked_up_food: Option<EntityId>,
        /// Food deposited into the friendly headquarters on arrival.
        #[serde(default)]
        deposited_food: Option<EntityId>,
    },
    /// New unit created by a headquarters.
    Spawn {
        /// Identifier allocated to the new unit.
        unit: EntityId,
        /// Kind of the new unit.
        kind: UnitKind,
        /// Cell the new unit occupies.
        position: Position,
        /// Food deducted from the team.
        cost: u32,
    },
    /// Citizen picking up adjacent loose food.
    PickUpFood {
        /// Food now carried.
        food: EntityId,
        /// Cell the food was lying on.
        from: Position,
    },
    /// Citizen putting down carried food.
    DropOffFood {
        /// Food that was carried.
        food: EntityId,
        /// Cell that received the food.
        position: Position,
        /// Whether the food was absorbed into the team stockpile.
        deposited: bool,
    },
}

impl Effect {
    /// Cell most closely associated with the effect's result.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Attack { .. } => None,
            Self::Move { to, .. } => Some(*to),
            Self::Spawn { position, .. } | Self::DropOffFood { position, .. } => Some(*position),
            Self::PickUpFood { from, .. } => Some(*from),
        }
    }
}

/// Reasons a command fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
pub enum ActionError {
    /// The issuing unit does not exist.
    #[error("unit {0} does not exist")]
    UnitNotFound(EntityId),
    /// The issuing unit has no hit points left.
    #[error("unit {0} is dead")]
    UnitDead(EntityId),
    /// The attack target does not exist.
    #[error("target {0} does not exist")]
    TargetNotFound(EntityId),
    /// The attack target has no hit points left.
    #[error("target {0} is dead")]
    TargetDead(EntityId),
    /// The attack target is not a unit.
    #[error("entity {0} cannot be attacked")]
    NotAttackable(EntityId),
    /// The attack target belongs to the attacker's team.
    #[error("target {0} is on the same team")]
    FriendlyTarget(EntityId),
    /// The target is out of range and the attacker cannot move.
    #[error("target {0} is out of range")]
    TargetOutOfRange(EntityId),
    /// The unit cannot move.
    #[error("unit {0} cannot move")]
    Immobile(EntityId),
    /// The requested cell is outside the board.
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),
    /// The requested cell holds a wall.
    #[error("position {0} is blocked by a wall")]
    Wall(Position),
    /// The requested cell belongs to an enemy headquarters.
    #[error("position {0} belongs to an enemy headquarters")]
    EnemyHeadquarters(Position),
    /// The requested cell is occupied.
    #[error("position {0} is occupied")]
    Occupied(Position),
    /// No path within the unit's reach leads to the requested cell.
    #[error("position {0} is unreachable")]
    Unreachable(Position),
    /// Only citizens can carry food.
    #[error("unit {0} is not a citizen")]
    NotCitizen(EntityId),
    /// The citizen already carries food.
    #[error("unit {0} already carries food")]
    AlreadyCarrying(EntityId),
    /// The citizen carries no food.
    #[error("unit {0} carries no food")]
    NotCarrying(EntityId),
    /// The food item does not exist.
    #[error("food {0} does not exist")]
    FoodNotFound(EntityId),
    /// The food item is carried by another unit.
    #[error("food {0} is already claimed")]
    FoodClaimed(EntityId),
    /// The cell already holds loose food.
    #[error("position {0} already holds food")]
    FoodPresent(Position),
    /// The target cell is not orthogonally adjacent to the unit.
    #[error("position {0} is not adjacent")]
    NotAdjacent(Position),
    /// Only headquarters can spawn units.
    #[error("unit {0} is not a headquarters")]
    NotHeadquarters(EntityId),
    /// The team reached the population cap.
    #[error("population cap of {cap} reached")]
    PopulationCap {
        /// Configured population cap.
        cap: u32,
    },
    /// The team cannot afford the unit.
    #[error("insufficient food: {required} required, {available} available")]
    InsufficientFood {
        /// Cost of the requested unit.
        required: u32,
        /// Food held by the team.
        available: u32,
    },
    /// No free cell borders the headquarters.
    #[error("no free spawn position")]
    NoSpawnPosition,
    /// The requested spawn cell does not border the headquarters.
    #[error("position {0} is not a spawn position")]
    InvalidSpawnPosition(Position),
}

#[cfg(test)]
mod tests {
    use super::{
        Action, ActionError, Command, CommandKind, CommandType, Effect, EntityId, FighterKind,
        Footprint, Phase, Position, UnitKind, UnitSettings,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn adjacents_are_orthogonal_neighbours() {
        let origin = Position::new(5, 5);
        let adjacents = origin.adjacents();
        assert_eq!(
            adjacents,
            [
                Position::new(5, 4),
                Position::new(6, 5),
                Position::new(5, 6),
                Position::new(4, 5),
            ]
        );
        assert!(adjacents.iter().all(|cell| cell.is_adjacent_to(origin)));
        assert!(!origin.is_adjacent_to(Position::new(6, 6)));
    }

    #[test]
    fn adjacents_within_distance_expands_without_duplicates() {
        let origin = Position::new(0, 0);
        let cells = origin.adjacents_within_distance(2);

        assert_eq!(cells.len(), 12);
        assert_eq!(&cells[..4], &origin.adjacents());
        assert!(!cells.contains(&origin));
        assert!(cells
            .iter()
            .all(|cell| (1..=2).contains(&cell.manhattan_distance(origin))));
        assert!(origin.adjacents_within_distance(0).is_empty());
    }

    #[test]
    fn key_is_canonical() {
        assert_eq!(Position::new(-3, 7).key(), "-3,7");
    }

    #[test]
    fn footprint_covering_and_ring() {
        let footprint = UnitKind::Headquarters.footprint();
        let anchor = Position::new(2, 2);
        let covered = footprint.covering(anchor);

        assert_eq!(
            covered,
            vec![
                Position::new(2, 2),
                Position::new(3, 2),
                Position::new(2, 3),
                Position::new(3, 3),
            ]
        );
        assert!(footprint.contains(anchor, Position::new(3, 3)));
        assert!(!footprint.contains(anchor, Position::new(4, 3)));

        let ring = footprint.ring(anchor);
        assert_eq!(ring.len(), 8);
        assert_eq!(ring[0], Position::new(2, 1));
        assert!(ring.iter().all(|cell| !covered.contains(cell)));
        assert_eq!(footprint.distance_to(anchor, Position::new(6, 2)), 3);
        assert_eq!(Footprint::SINGLE.covering(anchor), vec![anchor]);
    }

    #[test]
    fn counters_form_a_cycle() {
        for kind in FighterKind::ALL {
            assert_ne!(kind.counters(), kind);
            assert_eq!(kind.counters().counters().counters(), kind);
        }
    }

    #[test]
    fn damage_bonus_applies_only_to_countered_kind() {
        let settings = UnitSettings::default();
        for kind in FighterKind::ALL {
            let attacker = UnitKind::Fighter(kind);
            let base = settings.stats(attacker).attack;
            assert!(settings.damage_against(attacker, UnitKind::Fighter(kind.counters())) > base);
            for other in FighterKind::ALL {
                if other != kind.counters() {
                    assert_eq!(settings.damage_against(attacker, UnitKind::Fighter(other)), base);
                }
            }
            assert_eq!(settings.damage_against(attacker, UnitKind::Headquarters), base);
            assert_eq!(settings.damage_against(attacker, UnitKind::Citizen), base);
        }
    }

    #[test]
    fn command_types_map_onto_phases() {
        assert_eq!(CommandType::Attack.phase(), Phase::Attack);
        assert_eq!(CommandType::PickUpFood.phase(), Phase::PickUp);
        assert_eq!(CommandType::DropOffFood.phase(), Phase::DropOff);
        assert_eq!(CommandType::Move.phase(), Phase::Move);
        assert_eq!(CommandType::SpawnFighter.phase(), Phase::Spawn);
        for (index, phase) in Phase::ORDER.iter().enumerate() {
            assert_eq!(phase.index(), index);
        }
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(-4, 12));
    }

    #[test]
    fn action_error_round_trips_through_bincode() {
        assert_round_trip(&ActionError::InsufficientFood {
            required: 3,
            available: 1,
        });
    }

    #[test]
    fn command_json_carries_type_discriminator() {
        let command = Command::new(
            EntityId::new(7),
            CommandKind::Move {
                destination: Position::new(5, 6),
                auto_pick_up_food: true,
                auto_drop_off_food: false,
            },
        );
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["kind"]["type"], "move");
        assert_eq!(json["kind"]["destination"]["x"], 5);
        assert_eq!(json["kind"]["autoPickUpFood"], true);

        let restored: Command = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, command);
    }

    #[test]
    fn action_json_tags_status_and_effect() {
        let action = Action::succeeded(
            EntityId::new(3),
            Effect::Spawn {
                unit: EntityId::new(40),
                kind: UnitKind::Fighter(FighterKind::Cavalry),
                position: Position::new(1, 4),
                cost: 3,
            },
        );
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(json["outcome"]["status"], "succeeded");
        assert_eq!(json["outcome"]["effect"]["type"], "spawn");

        let restored: Action = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, action);

        let failure = Action::failed(
            EntityId::new(3),
            CommandType::SpawnCitizen,
            ActionError::PopulationCap { cap: 20 },
        );
        let text = serde_json::to_string(&failure).expect("serialize");
        let restored: Action = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(restored.error(), Some(&ActionError::PopulationCap { cap: 20 }));
        assert!(!restored.is_success());
    }
}
