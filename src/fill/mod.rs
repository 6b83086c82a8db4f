//!
//! # Fill Synthesis
//!
//! Rule-driven generation of the extra geometry two independently drawn
//! layout fragments need once placed side by side.
//!
//! Every algorithm reports *why* nothing was produced through [NoFill],
//! rather than returning an empty value that callers must interpret.
//!

use std::fmt::Display;

use crate::error::Result;
use crate::geom::{LayerSpec, Purpose, Rect, Side};
use crate::grid::Interval;
use crate::tech::DesignRules;

pub mod abutment;
pub mod contact;
pub mod extremity;
pub mod poly;

pub use abutment::create_wells_and_implants_fills;
pub use contact::{calculate_tx_metal_fill, TxMetalFill};
pub use extremity::well_implant_instance_fills;

/// Reason a fill algorithm produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum NoFill {
    /// One side of the query has no shapes on the layer
    MissingShapes(Side),
    /// Shapes exist on both sides, but no pair lines up
    NoOverlap,
    /// The contact stack already meets the minimum metal width
    ContactStackSufficient { height: f64, limit: f64 },
    /// The fill would be narrower than the layer minimum
    BelowMinimum { width: f64, min_width: f64 },
    /// The reference instance is not rotated a quarter turn
    NotRotated,
    NoDummies,
    NoRealPoly,
}

impl Display for NoFill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingShapes(side) => write!(f, "no shapes on the {side} side"),
            Self::NoOverlap => write!(f, "no overlapping shapes"),
            Self::ContactStackSufficient { height, limit } => {
                write!(f, "contact stack height {height} exceeds {limit}")
            }
            Self::BelowMinimum { width, min_width } => {
                write!(f, "fill width {width} below minimum {min_width}")
            }
            Self::NotRotated => write!(f, "reference instance is not rotated"),
            Self::NoDummies => write!(f, "no dummy shapes on the facing side"),
            Self::NoRealPoly => write!(f, "no non-dummy poly"),
        }
    }
}

/// The result of a single fill computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Fill(T),
    Skip(NoFill),
}

impl<T> Outcome<T> {
    pub fn is_fill(&self) -> bool {
        matches!(self, Self::Fill(_))
    }

    /// The fill, discarding any skip reason.
    pub fn fill(self) -> Option<T> {
        match self {
            Self::Fill(t) => Some(t),
            Self::Skip(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&NoFill> {
        match self {
            Self::Fill(_) => None,
            Self::Skip(reason) => Some(reason),
        }
    }
}

/// A layer for which a multi-layer fill produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub layer: LayerSpec,
    pub reason: NoFill,
}

/// Fills produced across several layers, plus the layers that produced none.
#[derive(Debug, Clone, PartialEq)]
pub struct FillReport<T> {
    pub fills: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Default for FillReport<T> {
    fn default() -> Self {
        Self {
            fills: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> FillReport<T> {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub(crate) fn skip(&mut self, layer: &LayerSpec, reason: NoFill) {
        log::debug!("no fill on {layer}: {reason}");
        self.skipped.push(Skipped {
            layer: layer.clone(),
            reason,
        });
    }

    /// The skip reason recorded for `layer`, if any.
    pub fn skip_reason(&self, layer: &str) -> Option<&NoFill> {
        self.skipped
            .iter()
            .find(|s| s.layer.layer.as_str() == layer)
            .map(|s| &s.reason)
    }
}

/// A pair of shapes on either side of an abutment, and the vertical band where they line up.
#[derive(Debug, Clone, PartialEq)]
pub struct FillSpec {
    pub layer: LayerSpec,
    pub region_bottom: f64,
    pub region_top: f64,
    pub left: Rect,
    pub right: Rect,
    /// Edge the region was aligned on: [Side::Top] when the tops agree, else [Side::Bottom]
    pub align: Side,
}

impl FillSpec {
    pub fn region(&self) -> Interval {
        Interval::new(self.region_bottom, self.region_top)
    }

    /// A rectangle spanning both source shapes horizontally, over the aligned band.
    pub fn bridge(&self) -> Option<Rect> {
        let rect = Rect::from_edges(
            self.layer.layer.clone(),
            self.layer.purpose.clone(),
            self.left.left().min(self.right.left()),
            self.region_bottom,
            self.left.right().max(self.right.right()),
            self.region_top,
        );
        (!rect.is_degenerate()).then_some(rect)
    }
}

/// The layers an abutment fill examines: explicit `layers`, or the technology's defaults.
///
/// `purposes`, when given, must pair one-to-one with the chosen layers.
pub(crate) fn resolve_layers(
    rules: &(impl DesignRules + ?Sized),
    layers: Option<&[&str]>,
    purposes: Option<&[Purpose]>,
) -> Result<Vec<LayerSpec>> {
    match layers {
        Some(layers) => LayerSpec::zip(layers, purposes),
        None => {
            let defaults = rules.abutment_layers();
            match purposes {
                None => Ok(defaults.to_vec()),
                Some(purposes) => {
                    let names: Vec<&str> = defaults.iter().map(|s| s.layer.as_str()).collect();
                    LayerSpec::zip(&names, Some(purposes))
                }
            }
        }
    }
}
