//!
//! # Geometry Module
//!
//! Core geometric types: [Point], [Dir], [Side], [Purpose] and the layer-tagged [Rect]
//! that every clearance and fill operation consumes and produces.
//!

use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::{FillError, Result};
use crate::grid::{ranges_overlap, Interval};

pub mod transform;
pub use transform::{Mirror, Rotation, Transform};

/// A location in microns.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// A displacement of `dist` along `dir` only.
    pub fn along(dir: Dir, dist: f64) -> Self {
        match dir {
            Dir::Horiz => Self::new(dist, 0.),
            Dir::Vert => Self::new(0., dist),
        }
    }

    /// This point moved by `delta`.
    pub fn plus(&self, delta: Point) -> Point {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    /// Map this point from an instance's frame into its parent's.
    pub fn transform(&self, trans: &Transform) -> Point {
        let [x, y] = trans.apply([self.x, self.y]);
        Self::new(x, y)
    }
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Layout axis. Clearances are reported along one and filtered on the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dir {
    Horiz,
    Vert,
}

/// `!dir` is the orthogonal axis.
impl std::ops::Not for Dir {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Horiz => write!(f, "horizontal"),
            Self::Vert => write!(f, "vertical"),
        }
    }
}

impl FromStr for Dir {
    type Err = FillError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "h" | "horiz" | "horizontal" => Ok(Self::Horiz),
            "v" | "vert" | "vertical" => Ok(Self::Vert),
            _ => Err(FillError::InvalidRuleQuery(format!("unknown direction `{s}`"))),
        }
    }
}

/// One of the four sides of an axis-aligned box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Bottom,
    Top,
}

impl Side {
    /// The axis along which this side faces outward.
    pub fn dir(&self) -> Dir {
        match *self {
            Self::Left | Self::Right => Dir::Horiz,
            Self::Bottom | Self::Top => Dir::Vert,
        }
    }

    /// `1.0` for sides facing positive infinity, `-1.0` otherwise.
    pub fn sign(&self) -> f64 {
        match *self {
            Self::Right | Self::Top => 1.,
            Self::Left | Self::Bottom => -1.,
        }
    }

    /// The side facing `sign` along `dir`.
    pub fn from_dir_sign(dir: Dir, sign: f64) -> Self {
        match (dir, sign >= 0.) {
            (Dir::Horiz, true) => Self::Right,
            (Dir::Horiz, false) => Self::Left,
            (Dir::Vert, true) => Self::Top,
            (Dir::Vert, false) => Self::Bottom,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Bottom => write!(f, "bottom"),
            Self::Top => write!(f, "top"),
        }
    }
}

/// Layer-Purpose Enumeration
///
/// `Dummy` marks shapes drawn purely to satisfy density and pitch rules,
/// as opposed to `Drawing` shapes that belong to real devices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Drawing,
    Dummy,
    Pin,
    Label,
    /// Named purpose, not first-class supported
    Named(ArcStr),
}

impl Default for Purpose {
    fn default() -> Self {
        Self::Drawing
    }
}

impl Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Drawing => write!(f, "drawing"),
            Self::Dummy => write!(f, "dummy"),
            Self::Pin => write!(f, "pin"),
            Self::Label => write!(f, "label"),
            Self::Named(ref s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for Purpose {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "drawing" => Self::Drawing,
            "dummy" => Self::Dummy,
            "pin" => Self::Pin,
            "label" => Self::Label,
            other => Self::Named(ArcStr::from(other)),
        })
    }
}

/// A (layer, purpose) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerSpec {
    pub layer: ArcStr,
    #[serde(default)]
    pub purpose: Purpose,
}

impl LayerSpec {
    pub fn new(layer: impl Into<ArcStr>, purpose: Purpose) -> Self {
        Self {
            layer: layer.into(),
            purpose,
        }
    }

    pub fn drawing(layer: impl Into<ArcStr>) -> Self {
        Self::new(layer, Purpose::Drawing)
    }

    /// Zip parallel `layers` and `purposes` lists.
    ///
    /// Missing purposes default to [Purpose::Drawing];
    /// lists of different lengths are rejected.
    pub fn zip(layers: &[&str], purposes: Option<&[Purpose]>) -> Result<Vec<Self>> {
        match purposes {
            None => Ok(layers.iter().map(|l| Self::drawing(*l)).collect()),
            Some(purposes) => {
                if purposes.len() != layers.len() {
                    return Err(FillError::MismatchedLayerPurposes {
                        layers: layers.len(),
                        purposes: purposes.len(),
                    });
                }
                Ok(layers
                    .iter()
                    .zip(purposes)
                    .map(|(l, p)| Self::new(*l, p.clone()))
                    .collect())
            }
        }
    }
}

impl Display for LayerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.layer, self.purpose)
    }
}

/// # Rectangle
///
/// Axis-aligned rectangle on a single layer,
/// anchored at its lower-left corner `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub layer: ArcStr,
    #[serde(default)]
    pub purpose: Purpose,
    pub offset: Point,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a drawing-purpose rectangle with lower-left corner `offset`.
    pub fn new(layer: impl Into<ArcStr>, offset: Point, width: f64, height: f64) -> Self {
        Self {
            layer: layer.into(),
            purpose: Purpose::Drawing,
            offset,
            width,
            height,
        }
    }

    /// Create a drawing-purpose rectangle centered on `center`.
    pub fn from_center(layer: impl Into<ArcStr>, center: Point, width: f64, height: f64) -> Self {
        let offset = Point::new(center.x - width / 2., center.y - height / 2.);
        Self::new(layer, offset, width, height)
    }

    /// Create a rectangle from its edges. Edges may be given in either order.
    pub fn from_edges(
        layer: impl Into<ArcStr>,
        purpose: Purpose,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    ) -> Self {
        Self {
            layer: layer.into(),
            purpose,
            offset: Point::new(x0.min(x1), y0.min(y1)),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Create a rectangle spanning `hspan` horizontally and `vspan` vertically.
    pub fn from_spans(
        layer: impl Into<ArcStr>,
        purpose: Purpose,
        hspan: Interval,
        vspan: Interval,
    ) -> Self {
        Self::from_edges(layer, purpose, hspan.start, vspan.start, hspan.end, vspan.end)
    }

    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.offset.x
    }
    #[inline]
    pub fn right(&self) -> f64 {
        self.offset.x + self.width
    }
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.offset.y
    }
    #[inline]
    pub fn top(&self) -> f64 {
        self.offset.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.offset.x + self.width / 2.,
            self.offset.y + self.height / 2.,
        )
    }

    /// The coordinate of edge `side`.
    pub fn edge(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
            Side::Bottom => self.bottom(),
            Side::Top => self.top(),
        }
    }

    /// The (unrounded) projection of this rectangle onto axis `dir`.
    pub fn span(&self, dir: Dir) -> Interval {
        match dir {
            Dir::Horiz => Interval::new(self.left(), self.right()),
            Dir::Vert => Interval::new(self.bottom(), self.top()),
        }
    }

    /// The extent of the rectangle along `dir`.
    pub fn length(&self, dir: Dir) -> f64 {
        match dir {
            Dir::Horiz => self.width,
            Dir::Vert => self.height,
        }
    }

    /// Zero-area rectangles are never emitted as fill.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0. || self.height <= 0.
    }

    pub fn is_finite(&self) -> bool {
        self.offset.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// A copy of this rectangle grown by `delta` on every side.
    pub fn expand(&self, delta: f64) -> Rect {
        Rect {
            layer: self.layer.clone(),
            purpose: self.purpose.clone(),
            offset: Point::new(self.offset.x - delta, self.offset.y - delta),
            width: self.width + 2. * delta,
            height: self.height + 2. * delta,
        }
    }

    /// A copy of this rectangle shifted by `p`.
    pub fn translate(&self, p: Point) -> Rect {
        Rect {
            offset: self.offset.plus(p),
            ..self.clone()
        }
    }

    /// Closed overlap test: rectangles that merely touch overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        ranges_overlap(self.span(Dir::Horiz), other.span(Dir::Horiz))
            && ranges_overlap(self.span(Dir::Vert), other.span(Dir::Vert))
    }

    /// Whether this rectangle lies on layer `layer` with purpose `purpose`.
    pub fn is_on(&self, layer: &str, purpose: &Purpose) -> bool {
        self.layer.as_str() == layer && &self.purpose == purpose
    }

    /// Apply matrix-vector [Transform] `trans`.
    pub fn transform(&self, trans: &Transform) -> Rect {
        let p0 = self.offset.transform(trans);
        let p1 = Point::new(self.right(), self.top()).transform(trans);
        Self::from_edges(
            self.layer.clone(),
            self.purpose.clone(),
            p0.x,
            p0.y,
            p1.x,
            p1.y,
        )
    }
}
