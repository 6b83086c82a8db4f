//!
//! # Instance Transforms
//!
//! Instances are placed by a mirror, then a counter-clockwise rotation,
//! then a translation to the instance offset.
//!

use serde::{Deserialize, Serialize};

use super::Point;

/// Reflection applied to an instance before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirror {
    /// No reflection
    R0,
    /// Reflect about the x-axis (y becomes -y)
    MX,
    /// Reflect about the y-axis (x becomes -x)
    MY,
    /// Reflect about both axes
    XY,
}

impl Default for Mirror {
    fn default() -> Self {
        Self::R0
    }
}

impl Mirror {
    /// Whether the reflection negates x-coordinates,
    /// i.e. swaps an instance's left and right sides.
    pub fn flips_x(&self) -> bool {
        matches!(self, Self::MY | Self::XY)
    }

    /// Whether the reflection negates y-coordinates.
    pub fn flips_y(&self) -> bool {
        matches!(self, Self::MX | Self::XY)
    }

    fn matrix(&self) -> [[f64; 2]; 2] {
        let sx = if self.flips_x() { -1. } else { 1. };
        let sy = if self.flips_y() { -1. } else { 1. };
        [[sx, 0.], [0., sy]]
    }
}

/// Counter-clockwise rotation applied after reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::R0
    }
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match *self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    pub fn from_degrees(deg: i64) -> Option<Self> {
        match deg.rem_euclid(360) {
            0 => Some(Self::R0),
            90 => Some(Self::R90),
            180 => Some(Self::R180),
            270 => Some(Self::R270),
            _ => None,
        }
    }

    /// Whether this rotation exchanges the x and y axes.
    pub fn is_quarter_turn(&self) -> bool {
        matches!(self, Self::R90 | Self::R270)
    }

    fn matrix(&self) -> [[f64; 2]; 2] {
        match *self {
            Self::R0 => [[1., 0.], [0., 1.]],
            Self::R90 => [[0., -1.], [1., 0.]],
            Self::R180 => [[-1., 0.], [0., -1.]],
            Self::R270 => [[0., 1.], [-1., 0.]],
        }
    }
}

/// Placement of an instance frame inside its parent: `p' = a * p + b`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Row-major mirror-and-rotation matrix
    pub a: [[f64; 2]; 2],
    /// Offset added after `a`
    pub b: [f64; 2],
}

impl Transform {
    pub fn identity() -> Self {
        Self::translate(0., 0.)
    }

    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [x, y],
        }
    }

    /// Mirror, then rotate, then move to `offset`.
    pub fn from_instance(offset: &Point, mirror: Mirror, rotation: Rotation) -> Self {
        let r = rotation.matrix();
        let m = mirror.matrix();
        Self {
            a: [
                [r[0][0] * m[0][0], r[0][1] * m[1][1]],
                [r[1][0] * m[0][0], r[1][1] * m[1][1]],
            ],
            b: [offset.x, offset.y],
        }
    }

    /// Apply the transform to the coordinate pair `v`.
    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        let a = &self.a;
        [
            a[0][0] * v[0] + a[0][1] * v[1] + self.b[0],
            a[1][0] * v[0] + a[1][1] * v[1] + self.b[1],
        ]
    }

    /// The transform placing a grandchild frame in `parent`'s parent,
    /// given `child` placing it in `parent`'s frame. Order matters.
    pub fn cascade(parent: &Transform, child: &Transform) -> Transform {
        let (p, c) = (&parent.a, &child.a);
        let entry = |i: usize, j: usize| p[i][0] * c[0][j] + p[i][1] * c[1][j];
        Self {
            a: [[entry(0, 0), entry(0, 1)], [entry(1, 0), entry(1, 1)]],
            b: parent.apply(child.b),
        }
    }
}
