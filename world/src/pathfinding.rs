//! Walkability grid and A* search used for movement validation and planning.

use std::{cmp::Ordering, collections::BinaryHeap};

use outpost_core::Position;

/// Dense walkability grid mirroring the board's blocking occupancy.
///
/// Cells outside the board are reported as blocked so callers never need to
/// bounds-check before querying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkGrid {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
}

impl WalkGrid {
    fn new(width: u32, height: u32) -> Self {
        let cell_count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            blocked: vec![false; cell_count],
        }
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies on the board and is not blocked.
    #[must_use]
    pub fn is_walkable(&self, cell: Position) -> bool {
        self.index(cell)
            .and_then(|index| self.blocked.get(index).copied())
            .map_or(false, |blocked| !blocked)
    }

    fn set(&mut self, cell: Position, blocked: bool) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.blocked.get_mut(index) {
                *slot = blocked;
            }
        }
    }

    fn index(&self, cell: Position) -> Option<usize> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        usize::try_from(row)
            .ok()?
            .checked_mul(width)?
            .checked_add(usize::try_from(column).ok()?)
    }

    fn position_of(&self, index: usize) -> Position {
        let width = usize::try_from(self.width).unwrap_or(1).max(1);
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Shortest orthogonal path from `start` to `destination`.
    ///
    /// The returned sequence starts at `start` and ends at `destination`. The
    /// start cell may itself be blocked (it is normally occupied by the unit
    /// that moves); the destination must be walkable. Ties between equally
    /// short paths are broken by neighbour order (north, east, south, west)
    /// and insertion order, so identical grids always yield identical paths.
    #[must_use]
    pub fn path(&self, start: Position, destination: Position) -> Option<Vec<Position>> {
        let start_index = self.index(start)?;
        let goal_index = self.index(destination)?;
        if start_index == goal_index {
            return Some(vec![start]);
        }
        if !self.is_walkable(destination) {
            return None;
        }

        let mut open = BinaryHeap::new();
        let mut g_score = vec![u32::MAX; self.blocked.len()];
        let mut came_from: Vec<Option<usize>> = vec![None; self.blocked.len()];
        let mut tie: u64 = 0;

        g_score[start_index] = 0;
        open.push(OpenNode {
            f: start.manhattan_distance(destination),
            g: 0,
            tie,
            index: start_index,
        });

        while let Some(node) = open.pop() {
            if node.index == goal_index {
                return Some(self.reconstruct(&came_from, goal_index));
            }

            if node.g != g_score[node.index] {
                continue;
            }

            let cell = self.position_of(node.index);
            for neighbor in cell.adjacents() {
                if !self.is_walkable(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };

                let tentative = node.g.saturating_add(1);
                if tentative >= g_score[neighbor_index] {
                    continue;
                }

                came_from[neighbor_index] = Some(node.index);
                g_score[neighbor_index] = tentative;
                tie += 1;
                open.push(OpenNode {
                    f: tentative.saturating_add(neighbor.manhattan_distance(destination)),
                    g: tentative,
                    tie,
                    index: neighbor_index,
                });
            }
        }

        None
    }

    /// Every reachable path from `start`, one per reachable destination, in
    /// the order the destinations were supplied.
    #[must_use]
    pub fn paths(&self, start: Position, destinations: &[Position]) -> Vec<Vec<Position>> {
        destinations
            .iter()
            .filter_map(|destination| self.path(start, *destination))
            .collect()
    }

    /// Shortest of the reachable paths to `destinations`; the earliest
    /// destination wins ties.
    #[must_use]
    pub fn shortest_path(&self, start: Position, destinations: &[Position]) -> Option<Vec<Position>> {
        let mut best: Option<Vec<Position>> = None;
        for path in self.paths(start, destinations) {
            if best.as_ref().map_or(true, |current| path.len() < current.len()) {
                best = Some(path);
            }
        }
        best
    }

    fn reconstruct(&self, came_from: &[Option<usize>], goal: usize) -> Vec<Position> {
        let mut indices = vec![goal];
        let mut current = goal;
        while let Some(previous) = came_from[current] {
            indices.push(previous);
            current = previous;
        }
        indices.reverse();
        indices
            .into_iter()
            .map(|index| self.position_of(index))
            .collect()
    }
}

#[derive(Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    tie: u64,
    index: usize,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, u64) {
        (self.f, self.g, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the lowest estimate first.
        other.key().cmp(&self.key())
    }
}

/// Board-wide walkability state, seeded from walls and kept in step with
/// unit occupancy by the spatial index.
#[derive(Clone, Debug)]
pub struct PathFinder {
    grid: WalkGrid,
}

impl PathFinder {
    /// Creates a path finder for an empty board.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: WalkGrid::new(width, height),
        }
    }

    /// Marks a cell as blocked.
    pub(crate) fn block_position(&mut self, cell: Position) {
        self.grid.set(cell, true);
    }

    /// Marks a cell as walkable.
    pub(crate) fn clear_position(&mut self, cell: Position) {
        self.grid.set(cell, false);
    }

    /// Reports whether the cell is blocked or off the board.
    #[must_use]
    pub fn is_blocked(&self, cell: Position) -> bool {
        !self.grid.is_walkable(cell)
    }

    /// The shared walkability grid.
    #[must_use]
    pub fn grid(&self) -> &WalkGrid {
        &self.grid
    }

    /// Copy of the grid with the team's own headquarters cells unblocked.
    #[must_use]
    pub fn grid_for_team(&self, headquarters_cells: &[Position]) -> WalkGrid {
        let mut grid = self.grid.clone();
        for cell in headquarters_cells {
            grid.set(*cell, false);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_on_open_grid_is_manhattan_length() {
        let finder = PathFinder::new(6, 6);
        let start = Position::new(0, 0);
        let goal = Position::new(3, 2);

        let path = finder.grid().path(start, goal).expect("path exists");

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), 6);
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent_to(pair[1]));
        }
    }

    #[test]
    fn path_detours_around_blocked_cells() {
        let mut finder = PathFinder::new(3, 3);
        finder.block_position(Position::new(1, 0));
        finder.block_position(Position::new(1, 1));

        let path = finder
            .grid()
            .path(Position::new(0, 0), Position::new(2, 0))
            .expect("detour exists");

        assert_eq!(path.len(), 7);
        assert!(path.contains(&Position::new(1, 2)));
    }

    #[test]
    fn start_cell_may_be_blocked() {
        let mut finder = PathFinder::new(3, 1);
        finder.block_position(Position::new(0, 0));

        let path = finder.grid().path(Position::new(0, 0), Position::new(2, 0));

        assert_eq!(path.map(|cells| cells.len()), Some(3));
    }

    #[test]
    fn unreachable_destination_yields_none() {
        let mut finder = PathFinder::new(3, 3);
        for cell in Position::new(2, 2).adjacents() {
            finder.block_position(cell);
        }

        assert!(finder
            .grid()
            .path(Position::new(0, 0), Position::new(2, 2))
            .is_none());
        assert!(finder
            .grid()
            .path(Position::new(0, 0), Position::new(5, 5))
            .is_none());
    }

    #[test]
    fn team_grid_unblocks_headquarters_cells() {
        let mut finder = PathFinder::new(4, 1);
        finder.block_position(Position::new(1, 0));
        finder.block_position(Position::new(2, 0));

        let shared = finder.grid().path(Position::new(0, 0), Position::new(3, 0));
        let team = finder
            .grid_for_team(&[Position::new(1, 0), Position::new(2, 0)])
            .path(Position::new(0, 0), Position::new(3, 0));

        assert!(shared.is_none());
        assert_eq!(team.map(|cells| cells.len()), Some(4));
        assert!(finder.is_blocked(Position::new(1, 0)));
    }

    #[test]
    fn shortest_path_prefers_earliest_on_ties() {
        let finder = PathFinder::new(5, 5);
        let start = Position::new(2, 2);
        let destinations = [Position::new(4, 4), Position::new(2, 0), Position::new(0, 2)];

        let paths = finder.grid().paths(start, &destinations);
        let shortest = finder
            .grid()
            .shortest_path(start, &destinations)
            .expect("reachable");

        assert_eq!(paths.len(), 3);
        assert_eq!(shortest.last(), Some(&Position::new(2, 0)));
    }
}
