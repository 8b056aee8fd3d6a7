use crate::cell::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minimum room width in cells.
pub const MIN_ROOM_WIDTH: u32 = 15;
/// Minimum room height in cells.
pub const MIN_ROOM_HEIGHT: u32 = 12;

/// Background / super-foreground tile identifier.
pub type TileId = u16;

/// Cell coordinate. Any value is accepted; the grid wraps it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    /// Sentinel used by authoring data for "not set".
    pub const ORIGIN: GridPos = GridPos { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True for the unset sentinel.
    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Orthogonal neighbours (up, down, left, right), unwrapped.
    pub const fn neighbors4(self) -> [GridPos; 4] {
        [
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(1, 0),
        ]
    }

    /// Centre of the cell in tile units.
    pub fn center(self) -> (f32, f32) {
        (self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned box in tile units (used for the player hit-box).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TileRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl TileRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Half-open containment test.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// Grid shape errors raised when loading persisted rooms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("room {width}x{height} is smaller than the minimum room size")]
    TooSmall { width: u32, height: u32 },
    #[error("{layer} holds {found} entries, expected {expected}")]
    LayerSize {
        layer: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Rectangular cell array with parallel background layers.
///
/// Every coordinate accessor wraps modulo width/height. Wraparound rooms rely
/// on this, so out-of-range coordinates are never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRecord")]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    background: Vec<TileId>,
    super_foreground: Option<Vec<TileId>>,
}

#[derive(Deserialize)]
struct GridRecord {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    #[serde(default)]
    background: Vec<TileId>,
    #[serde(default)]
    super_foreground: Option<Vec<TileId>>,
}

impl TryFrom<GridRecord> for Grid {
    type Error = GridError;

    fn try_from(record: GridRecord) -> Result<Self, Self::Error> {
        let mut grid = Grid {
            width: record.width,
            height: record.height,
            cells: record.cells,
            background: record.background,
            super_foreground: record.super_foreground,
        };
        if grid.background.is_empty() {
            grid.background = vec![0; grid.cells.len()];
        }
        grid.validate()?;
        Ok(grid)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(MIN_ROOM_WIDTH, MIN_ROOM_HEIGHT)
    }
}

impl Grid {
    /// Allocate an empty grid. Dimensions are raised to the minimum room size.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(MIN_ROOM_WIDTH);
        let height = height.max(MIN_ROOM_HEIGHT);
        let area = (width * height) as usize;
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; area],
            background: vec![0; area],
            super_foreground: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Check the shape invariants of a loaded grid.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.width < MIN_ROOM_WIDTH || self.height < MIN_ROOM_HEIGHT {
            return Err(GridError::TooSmall {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.area();
        let layers = [
            ("cells", self.cells.len()),
            ("background", self.background.len()),
            (
                "super_foreground",
                self.super_foreground.as_ref().map_or(expected, Vec::len),
            ),
        ];
        for (layer, found) in layers {
            if found != expected {
                return Err(GridError::LayerSize {
                    layer,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Wrap a coordinate into the grid.
    pub fn wrap(&self, pos: GridPos) -> GridPos {
        GridPos {
            x: pos.x.rem_euclid(self.width as i32),
            y: pos.y.rem_euclid(self.height as i32),
        }
    }

    fn index(&self, pos: GridPos) -> usize {
        let pos = self.wrap(pos);
        pos.y as usize * self.width as usize + pos.x as usize
    }

    pub fn get(&self, pos: GridPos) -> Cell {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: GridPos, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    pub fn background(&self, pos: GridPos) -> TileId {
        self.background[self.index(pos)]
    }

    pub fn set_background(&mut self, pos: GridPos, tile: TileId) {
        let idx = self.index(pos);
        self.background[idx] = tile;
    }

    pub fn super_foreground(&self, pos: GridPos) -> Option<TileId> {
        let idx = self.index(pos);
        self.super_foreground.as_ref().map(|layer| layer[idx])
    }

    /// Write a super-foreground tile, allocating the layer on first use.
    pub fn set_super_foreground(&mut self, pos: GridPos, tile: TileId) {
        let idx = self.index(pos);
        let area = self.area();
        let layer = self.super_foreground.get_or_insert_with(|| vec![0; area]);
        layer[idx] = tile;
    }

    /// Every in-range position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
    }

    /// Positions whose cell satisfies `pred`, collected up front so callers
    /// can mutate the grid while walking the result.
    pub fn find(&self, mut pred: impl FnMut(Cell) -> bool) -> Vec<GridPos> {
        self.positions().filter(|&pos| pred(self.get(pos))).collect()
    }

    /// Wrapped orthogonal neighbours of `pos`.
    pub fn neighbors4(&self, pos: GridPos) -> [GridPos; 4] {
        pos.neighbors4().map(|p| self.wrap(p))
    }
}
