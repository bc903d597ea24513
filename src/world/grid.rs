//! The tile grid owned by a session.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

/// Rectangle of `HomeStructure` cells (the dome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl HomeRect {
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x
            && cell.x < self.x + self.width
            && cell.y >= self.y
            && cell.y < self.y + self.height
    }

    /// Centre of the rectangle in world units.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.x as f32 + self.width as f32 / 2.0) * TILE_SIZE,
            (self.y as f32 + self.height as f32 / 2.0) * TILE_SIZE,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileWorld {
    width: i32,
    height: i32,
    surface_depth: i32,
    home: HomeRect,
    tiles: Vec<Tile>,
}

impl TileWorld {
    /// An all-`Empty` grid with the given home rectangle. Generation fills it.
    pub fn blank(width: i32, height: i32, surface_depth: i32, home: HomeRect) -> Self {
        Self {
            width,
            height,
            surface_depth,
            home,
            tiles: vec![Tile::EMPTY; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn surface_depth(&self) -> i32 {
        self.surface_depth
    }

    pub fn home(&self) -> HomeRect {
        self.home
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn is_border(&self, cell: Cell) -> bool {
        cell.x == 0 || cell.y == 0 || cell.x == self.width - 1 || cell.y == self.height - 1
    }

    /// Depth below the surface band. Negative for sky rows.
    pub fn depth(&self, cell: Cell) -> i32 {
        cell.y - self.surface_depth
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    pub fn get(&self, cell: Cell) -> Option<&Tile> {
        self.index(cell).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut Tile> {
        self.index(cell).map(|i| &mut self.tiles[i])
    }

    pub fn kind_at(&self, cell: Cell) -> Option<TileKind> {
        self.get(cell).map(|t| t.kind)
    }

    pub fn set(&mut self, cell: Cell, tile: Tile) {
        if let Some(slot) = self.get_mut(cell) {
            *slot = tile;
        }
    }

    pub fn is_passable(&self, cell: Cell) -> bool {
        self.kind_at(cell).is_some_and(TileKind::is_passable)
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// Every cell with its tile, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Cell, &Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (Cell::new(i as i32 % width, i as i32 / width), tile))
    }

    /// Where the player appears: on the surface, just beside the dome.
    pub fn spawn_cell(&self) -> Cell {
        let x = (self.home.x + self.home.width).min(self.width - 2);
        Cell::new(x, self.surface_depth - 1)
    }
}
