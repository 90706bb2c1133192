use outpost_core::{EntityId, Position, TeamId};
use thiserror::Error;

use crate::config::MAX_BOARD_SIDE;

/// Fatal replay failures reported by [`crate::Game::import_turn`].
///
/// The replica is left untouched when one of these is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The imported turn does not directly follow the current turn.
    #[error("expected turn {expected}, received turn {received}")]
    NonSequentialTurn {
        /// Turn the replica can accept next.
        expected: u32,
        /// Turn that was offered.
        received: u32,
    },
    /// History already holds actions for the imported turn.
    #[error("turn {0} is already recorded")]
    TurnAlreadyRecorded(u32),
    /// The replica has already reached a terminal state.
    #[error("game is over, turn {0} cannot be imported")]
    GameOver(u32),
}

/// Reasons an entity cannot be placed while building a board.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The cell lies outside the board.
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),
    /// The cell is already taken by a blocking entity.
    #[error("position {0} is occupied")]
    Occupied(Position),
    /// The cell already holds loose food.
    #[error("position {0} already holds food")]
    FoodPresent(Position),
    /// The team has not been registered.
    #[error("{0} does not exist")]
    UnknownTeam(TeamId),
    /// The team has already been registered.
    #[error("{0} already exists")]
    DuplicateTeam(TeamId),
    /// Headquarters are only created together with their team.
    #[error("headquarters can only be placed through add_team")]
    Headquarters,
}

/// Reasons a snapshot cannot be turned back into a game.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// An entity could not be placed on the board.
    #[error("entity {id} cannot be placed: {source}")]
    Placement {
        /// Entity that failed to place.
        id: EntityId,
        /// Underlying placement failure.
        #[source]
        source: PlacementError,
    },
    /// The board exceeds the largest supported side.
    #[error("board {width}x{height} is larger than {max}x{max}", max = MAX_BOARD_SIDE)]
    BoardTooLarge {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// A citizen or fighter is recorded with no hit points left.
    #[error("unit {0} is recorded with no hit points")]
    DeadUnit(EntityId),
    /// Two entities share an identifier.
    #[error("entity id {0} is used more than once")]
    DuplicateId(EntityId),
    /// A unit references a team that is not part of the snapshot.
    #[error("unit {unit} belongs to unknown {team}")]
    UnknownTeam {
        /// Offending unit.
        unit: EntityId,
        /// Team it claims to belong to.
        team: TeamId,
    },
    /// Carrier and carried food disagree.
    #[error("food {food} and carrier {carrier} disagree")]
    CarryMismatch {
        /// Carried food.
        food: EntityId,
        /// Claimed carrier.
        carrier: EntityId,
    },
    /// The next entity id would collide with an existing entity.
    #[error("next entity id {0} collides with existing entities")]
    StaleNextId(u32),
}
