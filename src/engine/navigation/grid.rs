// Static walkability grid and A* search over it
//
// Built once per map. A cell is blocked when an agent-sized box centred on it
// touches an obstacle. Search is 8-connected without corner cutting.

use super::path::PathPlanner;
use super::NavError;
use crate::engine::physics::{ObstacleMap, Rect};
use glam::Vec2;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

/// How far (in cells) a blocked start or goal is moved to reach open ground
const SNAP_RADIUS: usize = 2;

/// Grid coordinates of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Walkability of every cell of a map
#[derive(Debug, Clone)]
pub struct WalkabilityGrid {
    origin: Vec2,
    cell_size: f32,
    cols: usize,
    rows: usize,
    walkable: Vec<bool>,
}

impl WalkabilityGrid {
    /// Rasterise `obstacles` over `bounds`
    pub fn build(
        bounds: Rect,
        cell_size: f32,
        agent_size: Vec2,
        obstacles: &ObstacleMap,
    ) -> Result<Self, NavError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(NavError::InvalidCellSize(cell_size));
        }
        if !(bounds.width > 0.0 && bounds.height > 0.0) {
            return Err(NavError::GridMissing(format!(
                "map bounds {}x{} have no area",
                bounds.width, bounds.height
            )));
        }

        let cols = (bounds.width / cell_size).ceil() as usize;
        let rows = (bounds.height / cell_size).ceil() as usize;

        let mut grid = Self {
            origin: bounds.min(),
            cell_size,
            cols,
            rows,
            walkable: Vec::with_capacity(cols * rows),
        };

        for row in 0..rows {
            for col in 0..cols {
                let center = grid.cell_center(Cell::new(col, row));
                grid.walkable.push(!obstacles.overlaps_box(center, agent_size));
            }
        }

        let blocked = grid.walkable.iter().filter(|w| !**w).count();
        log::info!(
            "Built walkability grid {}x{} (cell {}), {} blocked cells",
            cols,
            rows,
            cell_size,
            blocked
        );

        Ok(grid)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing a world position, if inside the grid
    pub fn world_to_cell(&self, world: Vec2) -> Option<Cell> {
        let local = (world - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let cell = Cell::new(local.x.floor() as usize, local.y.floor() as usize);
        (cell.col < self.cols && cell.row < self.rows).then_some(cell)
    }

    /// Cell containing a world position, clamped onto the grid
    pub fn clamped_cell(&self, world: Vec2) -> Cell {
        let local = ((world - self.origin) / self.cell_size).max(Vec2::ZERO);
        Cell::new(
            (local.x.floor() as usize).min(self.cols - 1),
            (local.y.floor() as usize).min(self.rows - 1),
        )
    }

    /// World position of a cell's centre
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        self.origin
            + Vec2::new(
                (cell.col as f32 + 0.5) * self.cell_size,
                (cell.row as f32 + 0.5) * self.cell_size,
            )
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index_of(cell)
            .and_then(|index| self.walkable.get(index))
            .copied()
            .unwrap_or(false)
    }

    fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.col >= self.cols || cell.row >= self.rows {
            return None;
        }
        Some(cell.row * self.cols + cell.col)
    }

    fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index % self.cols, index / self.cols)
    }

    /// Closest walkable cell within `SNAP_RADIUS` rings of `cell`
    fn nearest_walkable(&self, cell: Cell) -> Option<Cell> {
        if self.is_walkable(cell) {
            return Some(cell);
        }
        for radius in 1..=SNAP_RADIUS {
            let mut best: Option<(usize, Cell)> = None;
            let col_min = cell.col.saturating_sub(radius);
            let row_min = cell.row.saturating_sub(radius);
            for row in row_min..=cell.row + radius {
                for col in col_min..=cell.col + radius {
                    let candidate = Cell::new(col, row);
                    if !self.is_walkable(candidate) {
                        continue;
                    }
                    let d = col.abs_diff(cell.col).pow(2) + row.abs_diff(cell.row).pow(2);
                    if best.map_or(true, |(best_d, _)| d < best_d) {
                        best = Some((d, candidate));
                    }
                }
            }
            if let Some((_, found)) = best {
                return Some(found);
            }
        }
        None
    }

    /// A* between two cells; returns the cells from start to goal inclusive
    pub fn find_cells(&self, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
        let start_index = self.index_of(start)?;
        let goal_index = self.index_of(goal)?;
        if !self.is_walkable(start) || !self.is_walkable(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }

        let node_count = self.cols * self.rows;
        let mut closed = vec![false; node_count];
        let mut best_g = vec![u32::MAX; node_count];
        let mut parent = vec![None::<usize>; node_count];
        let mut open = BinaryHeap::new();

        best_g[start_index] = 0;
        let h = octile(start, goal);
        open.push(OpenNode {
            f: h,
            h,
            index: start_index,
        });

        while let Some(current) = open.pop() {
            if closed[current.index] {
                continue;
            }
            closed[current.index] = true;

            if current.index == goal_index {
                return Some(self.reconstruct(&parent, start_index, goal_index));
            }

            let cell = self.cell_at(current.index);
            let g = best_g[current.index];
            for (neighbor, step_cost) in self.neighbors(cell) {
                let Some(neighbor_index) = self.index_of(neighbor) else {
                    continue;
                };
                if closed[neighbor_index] {
                    continue;
                }

                let tentative = g.saturating_add(step_cost);
                if tentative >= best_g[neighbor_index] {
                    continue;
                }
                best_g[neighbor_index] = tentative;
                parent[neighbor_index] = Some(current.index);

                let h = octile(neighbor, goal);
                open.push(OpenNode {
                    f: tentative.saturating_add(h),
                    h,
                    index: neighbor_index,
                });
            }
        }

        None
    }

    /// Walkable neighbours with their step cost. Diagonals need both
    /// adjacent straight cells open so paths never clip a corner.
    fn neighbors(&self, cell: Cell) -> Vec<(Cell, u32)> {
        let mut result = Vec::with_capacity(8);
        let col = cell.col as isize;
        let row = cell.row as isize;

        for (dc, dr) in [
            (0, 1),
            (1, 0),
            (0, -1),
            (-1, 0),
            (1, 1),
            (1, -1),
            (-1, -1),
            (-1, 1),
        ] {
            let Some(neighbor) = self.offset(col + dc, row + dr) else {
                continue;
            };
            if !self.is_walkable(neighbor) {
                continue;
            }

            if dc != 0 && dr != 0 {
                let side_a = self.offset(col + dc, row);
                let side_b = self.offset(col, row + dr);
                let open = |side: Option<Cell>| side.map_or(false, |c| self.is_walkable(c));
                if !open(side_a) || !open(side_b) {
                    continue;
                }
                result.push((neighbor, DIAGONAL_COST));
            } else {
                result.push((neighbor, STRAIGHT_COST));
            }
        }

        result
    }

    fn offset(&self, col: isize, row: isize) -> Option<Cell> {
        if col < 0 || row < 0 {
            return None;
        }
        let cell = Cell::new(col as usize, row as usize);
        self.index_of(cell).map(|_| cell)
    }

    fn reconstruct(&self, parent: &[Option<usize>], start_index: usize, goal_index: usize) -> Vec<Cell> {
        let mut cursor = goal_index;
        let mut cells = vec![self.cell_at(cursor)];
        while cursor != start_index {
            match parent[cursor] {
                Some(previous) => {
                    cursor = previous;
                    cells.push(self.cell_at(cursor));
                }
                None => break,
            }
        }
        cells.reverse();
        cells
    }
}

impl PathPlanner for WalkabilityGrid {
    /// Waypoints are cell centres from the start cell to the goal cell.
    /// Positions off the map search from the nearest edge cell.
    fn find_path(&self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        let start = self.nearest_walkable(self.clamped_cell(from))?;
        let goal = self.nearest_walkable(self.clamped_cell(to))?;
        let cells = self.find_cells(start, goal)?;
        Some(cells.into_iter().map(|cell| self.cell_center(cell)).collect())
    }

    fn cell_size(&self) -> f32 {
        self.cell_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    h: u32,
    index: usize,
}

// Reversed so the max-heap pops the lowest f (then lowest h)
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn octile(a: Cell, b: Cell) -> u32 {
    let dx = a.col.abs_diff(b.col) as u32;
    let dy = a.row.abs_diff(b.row) as u32;
    let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
    STRAIGHT_COST * (long - short) + DIAGONAL_COST * short
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: f32, height: f32) -> WalkabilityGrid {
        WalkabilityGrid::build(
            Rect::new(0.0, 0.0, width, height),
            30.0,
            Vec2::splat(20.0),
            &ObstacleMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_build_dimensions() {
        let grid = open_grid(300.0, 100.0);
        assert_eq!(grid.cols(), 10);
        assert_eq!(grid.rows(), 4);
        assert!(grid.is_walkable(Cell::new(9, 3)));
        assert!(!grid.is_walkable(Cell::new(10, 0)));
    }

    #[test]
    fn test_invalid_setup_is_fatal() {
        let obstacles = ObstacleMap::new();
        let err = WalkabilityGrid::build(Rect::new(0.0, 0.0, 0.0, 10.0), 30.0, Vec2::ONE, &obstacles)
            .unwrap_err();
        assert!(matches!(err, NavError::GridMissing(_)));

        let err = WalkabilityGrid::build(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Vec2::ONE, &obstacles)
            .unwrap_err();
        assert!(matches!(err, NavError::InvalidCellSize(_)));
    }

    #[test]
    fn test_world_to_cell_round_trip() {
        let grid = open_grid(300.0, 300.0);
        let cell = grid.world_to_cell(Vec2::new(65.0, 10.0)).unwrap();
        assert_eq!(cell, Cell::new(2, 0));
        assert_eq!(grid.cell_center(cell), Vec2::new(75.0, 15.0));
        assert!(grid.world_to_cell(Vec2::new(-1.0, 10.0)).is_none());
        assert!(grid.world_to_cell(Vec2::new(301.0, 10.0)).is_none());
        assert_eq!(grid.clamped_cell(Vec2::new(-50.0, 900.0)), Cell::new(0, 9));
    }

    #[test]
    fn test_straight_path_in_open_field() {
        let grid = open_grid(300.0, 90.0);
        let path = grid.find_path(Vec2::new(15.0, 45.0), Vec2::new(285.0, 45.0)).unwrap();
        assert_eq!(path.len(), 10);
        assert_eq!(path[0], Vec2::new(15.0, 45.0));
        assert_eq!(path[9], Vec2::new(285.0, 45.0));
        assert!(path.iter().all(|p| p.y == 45.0));
    }

    #[test]
    fn test_path_goes_around_wall() {
        // Vertical wall with a gap at the top
        let obstacles = ObstacleMap::from_rects([Rect::new(140.0, 0.0, 20.0, 240.0)]);
        let grid = WalkabilityGrid::build(
            Rect::new(0.0, 0.0, 300.0, 300.0),
            30.0,
            Vec2::splat(10.0),
            &obstacles,
        )
        .unwrap();

        let path = grid.find_path(Vec2::new(45.0, 45.0), Vec2::new(255.0, 45.0)).unwrap();
        for point in &path {
            assert!(!obstacles.overlaps_box(*point, Vec2::splat(10.0)));
        }
        let highest = path.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!(highest > 240.0, "path must climb over the wall, got {:?}", path);
    }

    #[test]
    fn test_unreachable_goal() {
        // Wall splitting the map completely
        let obstacles = ObstacleMap::from_rects([Rect::new(140.0, 0.0, 20.0, 300.0)]);
        let grid = WalkabilityGrid::build(
            Rect::new(0.0, 0.0, 300.0, 300.0),
            30.0,
            Vec2::splat(10.0),
            &obstacles,
        )
        .unwrap();
        assert!(grid.find_path(Vec2::new(45.0, 45.0), Vec2::new(255.0, 45.0)).is_none());
    }

    #[test]
    fn test_blocked_goal_snaps_to_open_cell() {
        let obstacles = ObstacleMap::from_rects([Rect::new(120.0, 120.0, 30.0, 30.0)]);
        let grid = WalkabilityGrid::build(
            Rect::new(0.0, 0.0, 300.0, 300.0),
            30.0,
            Vec2::splat(10.0),
            &obstacles,
        )
        .unwrap();
        let path = grid.find_path(Vec2::new(15.0, 15.0), Vec2::new(135.0, 135.0)).unwrap();
        let last = *path.last().unwrap();
        assert!(!obstacles.overlaps_box(last, Vec2::splat(10.0)));
        assert!(last.distance(Vec2::new(135.0, 135.0)) <= 30.0 * 1.5);
    }

    #[test]
    fn test_diagonal_does_not_cut_corners() {
        let grid = open_grid(90.0, 90.0);
        let cells = grid.find_cells(Cell::new(0, 0), Cell::new(2, 2)).unwrap();
        assert_eq!(cells.len(), 3, "open field goes straight diagonally");

        // Block the two cells flanking the first diagonal step
        let obstacles = ObstacleMap::from_rects([
            Rect::new(35.0, 5.0, 20.0, 20.0),
            Rect::new(5.0, 35.0, 20.0, 20.0),
        ]);
        let grid = WalkabilityGrid::build(
            Rect::new(0.0, 0.0, 90.0, 90.0),
            30.0,
            Vec2::splat(10.0),
            &obstacles,
        )
        .unwrap();
        assert!(grid.find_cells(Cell::new(0, 0), Cell::new(2, 2)).is_none());
    }
}
