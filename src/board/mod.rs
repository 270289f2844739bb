//! Hex board model: tiles, adjacency, pathfinding, area and line queries.
//!
//! The board is built once per match and shared read-only (`Arc<Board>`).

pub mod geometry;
pub mod layout;
pub mod tile;

pub use geometry::{angle_diff, Axial, Point};
pub use layout::{Board, BoardLayout, Neighbors};
pub use tile::TileId;
