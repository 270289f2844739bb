//! The hex board: tile layout, adjacency and spatial queries.
//!
//! ## Layout
//!
//! Rows are horizontally centred and offset by half a hex from their
//! neighbours. The standard board has nine rows with
//! `4, 5, 6, 7, 8, 7, 6, 5, 4` tiles (`A`..`I`).
//!
//! ## Adjacency
//!
//! Adjacency is derived from pixel geometry: two tiles are neighbours when
//! their centre distance is within 18% of one of the hex step lengths
//! (horizontal, vertical, diagonal). Each tile keeps its six nearest such
//! tiles, nearest first.
//!
//! ## Queries
//!
//! - `distance`: BFS shortest path, with a caller-supplied blocked predicate
//! - `area`: BFS expansion up to a hop radius
//! - `hex_line`: cube-coordinate line between two tiles
//! - `segment_line`: tiles whose centres lie close to the screen segment
//! - `mirror_horizontal`: same-row reflection across the vertical axis
//!
//! ```
//! use hex_tactics::board::{Board, TileId};
//!
//! let board = Board::standard();
//! let a1: TileId = "A1".parse().unwrap();
//! let a3: TileId = "A3".parse().unwrap();
//! assert_eq!(board.distance(a1, a3, |_| false), Some(2));
//! assert_eq!(board.mirror_horizontal(a1), Some("A4".parse().unwrap()));
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use super::geometry::{Axial, Cube, Point};
use super::tile::TileId;

/// Relative tolerance when matching centre distances against step lengths.
const ADJACENCY_TOLERANCE: f64 = 0.18;

/// Projection slack at both ends of a segment query.
const SEGMENT_T_SLACK: f64 = 0.05;

/// Maximum perpendicular pixel distance from a segment.
const SEGMENT_MAX_OFFSET: f64 = 30.0;

/// Neighbour list; a hex has at most six.
pub type Neighbors = SmallVec<[TileId; 6]>;

/// Geometry parameters of a board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Tiles per row, top to bottom.
    pub rows: Vec<u8>,
    /// Hex corner radius in pixels.
    pub hex_radius: f64,
    /// Pixel position of the board centre.
    pub center: Point,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            rows: vec![4, 5, 6, 7, 8, 7, 6, 5, 4],
            hex_radius: 58.0,
            center: Point::new(960.0, 490.0),
        }
    }
}

impl BoardLayout {
    #[must_use]
    pub fn hex_width(&self) -> f64 {
        3f64.sqrt() * self.hex_radius
    }

    #[must_use]
    pub fn row_spacing(&self) -> f64 {
        0.75 * 2.0 * self.hex_radius
    }
}

/// Immutable tile graph for one match.
#[derive(Clone, Debug)]
pub struct Board {
    layout: BoardLayout,
    tiles: Vec<TileId>,
    positions: Vec<Point>,
    axial: Vec<Axial>,
    index: FxHashMap<TileId, usize>,
    by_axial: FxHashMap<Axial, usize>,
    neighbors: Vec<Neighbors>,
}

impl Board {
    /// The standard nine-row board.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(BoardLayout::default())
    }

    /// Build a board from a layout.
    #[must_use]
    pub fn new(layout: BoardLayout) -> Self {
        let hex_w = layout.hex_width();
        let v_space = layout.row_spacing();
        let mid = (layout.rows.len() as f64 - 1.0) / 2.0;
        let mid_row = (layout.rows.len() as i32 - 1) / 2;

        let mut tiles = Vec::new();
        let mut positions = Vec::new();
        let mut axial = Vec::new();

        for (ri, &count) in layout.rows.iter().enumerate() {
            let y = layout.center.y + (ri as f64 - mid) * v_space;
            let half = (f64::from(count) - 1.0) * hex_w / 2.0;
            let r = ri as i32 - mid_row;
            for i in 0..count {
                let x = layout.center.x - half + f64::from(i) * hex_w;
                // doubled-width column, shifted so its parity matches the row
                let doubled = 2 * i32::from(i) - i32::from(count) + 2;
                tiles.push(TileId::new(ri as u8, i));
                positions.push(Point::new(x, y));
                axial.push(Axial { q: (doubled - r) / 2, r });
            }
        }

        let index = tiles.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        let by_axial = axial.iter().enumerate().map(|(i, a)| (*a, i)).collect();

        let steps = [
            hex_w,
            v_space,
            (hex_w / 2.0).hypot(v_space),
        ];
        let neighbors = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let mut near: Vec<(f64, usize)> = positions
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .filter_map(|(j, &q)| {
                        let d = p.distance(q);
                        steps
                            .iter()
                            .any(|&t| (d - t).abs() <= t * ADJACENCY_TOLERANCE)
                            .then_some((d, j))
                    })
                    .collect();
                near.sort_by(|a, b| a.0.total_cmp(&b.0));
                near.into_iter().take(6).map(|(_, j)| tiles[j]).collect()
            })
            .collect();

        Self {
            layout,
            tiles,
            positions,
            axial,
            index,
            by_axial,
            neighbors,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn contains(&self, tile: TileId) -> bool {
        self.index.contains_key(&tile)
    }

    #[must_use]
    pub fn position(&self, tile: TileId) -> Option<Point> {
        self.index.get(&tile).map(|&i| self.positions[i])
    }

    #[must_use]
    pub fn axial(&self, tile: TileId) -> Option<Axial> {
        self.index.get(&tile).map(|&i| self.axial[i])
    }

    /// Neighbours nearest-first; empty for unknown tiles.
    #[must_use]
    pub fn neighbors(&self, tile: TileId) -> &[TileId] {
        self.index
            .get(&tile)
            .map_or(&[][..], |&i| self.neighbors[i].as_slice())
    }

    #[must_use]
    pub fn is_adjacent(&self, a: TileId, b: TileId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Number of tiles in a row.
    #[must_use]
    pub fn row_len(&self, row: u8) -> Option<u8> {
        self.layout.rows.get(usize::from(row)).copied()
    }

    #[must_use]
    pub fn same_row(&self, a: TileId, b: TileId) -> bool {
        a.row() == b.row()
    }

    /// Pixel centre of the whole board.
    #[must_use]
    pub fn center(&self) -> Point {
        self.layout.center
    }

    /// Screen-space bearing from one tile centre to another.
    #[must_use]
    pub fn bearing(&self, from: TileId, to: TileId) -> Option<f64> {
        Some(self.position(from)?.bearing_to(self.position(to)?))
    }

    /// Shortest path length in hops, or `None` if unreachable.
    ///
    /// `blocked` tiles are never entered (the start tile is exempt), so a
    /// blocked goal is unreachable. A tile's distance to itself is 0.
    pub fn distance(&self, from: TileId, to: TileId, blocked: impl Fn(TileId) -> bool) -> Option<u32> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(0);
        }
        let mut seen = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        seen[self.index[&from]] = true;
        queue.push_back((from, 0u32));

        while let Some((tile, d)) = queue.pop_front() {
            for &next in self.neighbors(tile) {
                let ni = self.index[&next];
                if seen[ni] || blocked(next) {
                    continue;
                }
                if next == to {
                    return Some(d + 1);
                }
                seen[ni] = true;
                queue.push_back((next, d + 1));
            }
        }
        None
    }

    /// Tiles reachable within `radius` hops of `center`, centre first, in BFS order.
    pub fn area(&self, center: TileId, radius: u32, blocked: impl Fn(TileId) -> bool) -> Vec<TileId> {
        if !self.contains(center) {
            return Vec::new();
        }
        let mut seen = vec![false; self.tiles.len()];
        let mut out = vec![center];
        let mut queue = VecDeque::from([(center, 0u32)]);
        seen[self.index[&center]] = true;

        while let Some((tile, d)) = queue.pop_front() {
            if d == radius {
                continue;
            }
            for &next in self.neighbors(tile) {
                let ni = self.index[&next];
                if seen[ni] || blocked(next) {
                    continue;
                }
                seen[ni] = true;
                out.push(next);
                queue.push_back((next, d + 1));
            }
        }
        out
    }

    /// Cube-coordinate line from `a` to `b`, both endpoints included.
    ///
    /// A tile to itself yields a single-tile path.
    #[must_use]
    pub fn hex_line(&self, a: TileId, b: TileId) -> Vec<TileId> {
        let (Some(qa), Some(qb)) = (self.axial(a), self.axial(b)) else {
            return Vec::new();
        };
        let n = super::geometry::cube_distance(qa, qb);
        if n == 0 {
            return vec![a];
        }
        let (ca, cb) = (Cube::from(qa), Cube::from(qb));
        let mut out: Vec<TileId> = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let t = f64::from(i) / f64::from(n);
            if let Some(&idx) = self.by_axial.get(&ca.lerp(cb, t).round()) {
                let tile = self.tiles[idx];
                if out.last() != Some(&tile) {
                    out.push(tile);
                }
            }
        }
        out
    }

    /// Tiles whose centres lie within a narrow band around segment `a`-`b`,
    /// ordered by their projection along the segment.
    #[must_use]
    pub fn segment_line(&self, a: TileId, b: TileId) -> Vec<TileId> {
        let (Some(pa), Some(pb)) = (self.position(a), self.position(b)) else {
            return Vec::new();
        };
        let dx = pb.x - pa.x;
        let dy = pb.y - pa.y;
        let len2 = match dx * dx + dy * dy {
            l if l == 0.0 => 1.0,
            l => l,
        };

        let mut hits: Vec<(f64, TileId)> = self
            .tiles
            .iter()
            .zip(&self.positions)
            .filter_map(|(&tile, p)| {
                let t = ((p.x - pa.x) * dx + (p.y - pa.y) * dy) / len2;
                if !(-SEGMENT_T_SLACK..=1.0 + SEGMENT_T_SLACK).contains(&t) {
                    return None;
                }
                let foot = Point::new(pa.x + t * dx, pa.y + t * dy);
                (p.distance(foot) <= SEGMENT_MAX_OFFSET).then_some((t, tile))
            })
            .collect();
        hits.sort_by(|x, y| x.0.total_cmp(&y.0));
        hits.into_iter().map(|(_, tile)| tile).collect()
    }

    /// Reflect a tile across the vertical centre line, keeping its row.
    #[must_use]
    pub fn mirror_horizontal(&self, tile: TileId) -> Option<TileId> {
        let count = self.row_len(tile.row())?;
        if tile.col() >= count {
            return None;
        }
        Some(TileId::new(tile.row(), count - 1 - tile.col()))
    }
}
