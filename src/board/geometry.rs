//! Screen-space points and cube coordinates.

use serde::{Deserialize, Serialize};

/// Tile centre in screen pixels (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Angle of `other` as seen from `self`, in radians in `(-π, π]`.
    #[must_use]
    pub fn bearing_to(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Absolute angular difference folded into `[0, π]`.
#[must_use]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    if d > std::f64::consts::PI {
        2.0 * std::f64::consts::PI - d
    } else {
        d
    }
}

/// Axial hex coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

/// Cube coordinate with `x + y + z == 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cube {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Axial> for Cube {
    fn from(a: Axial) -> Self {
        let x = f64::from(a.q);
        let z = f64::from(a.r);
        Cube { x, y: -x - z, z }
    }
}

impl Cube {
    pub(crate) fn lerp(self, other: Cube, t: f64) -> Cube {
        Cube {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Round to the nearest hex, fixing up the component with the largest error.
    pub(crate) fn round(self) -> Axial {
        let mut rx = round_half_up(self.x);
        let ry = round_half_up(self.y);
        let mut rz = round_half_up(self.z);
        let dx = (rx - self.x).abs();
        let dy = (ry - self.y).abs();
        let dz = (rz - self.z).abs();
        if dx > dy && dx > dz {
            rx = -ry - rz;
        } else if dy <= dz {
            rz = -rx - ry;
        }
        // when y carries the largest error only y changes, and y is implied
        Axial { q: rx as i32, r: rz as i32 }
    }
}

/// Round with ties toward positive infinity, so `-0.5` becomes `0`.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Hex step count between two axial coordinates.
#[must_use]
pub fn cube_distance(a: Axial, b: Axial) -> u32 {
    let dq = (a.q - b.q).unsigned_abs();
    let dr = (a.r - b.r).unsigned_abs();
    let ds = ((a.q + a.r) - (b.q + b.r)).unsigned_abs();
    dq.max(dr).max(ds)
}
