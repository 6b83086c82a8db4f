//!
//! # Technology Rules
//!
//! Minimum width, spacing and area values, loaded from TOML.
//! The fill algorithms see them only through the [DesignRules] trait.
//!

use std::collections::HashMap;
use std::path::Path;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::{FillError, Result};
use crate::geom::LayerSpec;
use crate::grid::Grid;

pub mod sky130;

/// Design-rule queries consumed by the fill synthesizer.
///
/// Spacing is not a constant: wide or long-running shapes may need more room,
/// so [DesignRules::space_by_width_and_length] takes the geometry being checked.
pub trait DesignRules {
    /// The manufacturing grid.
    fn grid(&self) -> Grid;
    /// The gate poly layer.
    fn poly_layer(&self) -> &str;
    /// Layers checked by default when two cells abut.
    fn abutment_layers(&self) -> &[LayerSpec];
    /// Minimum same-layer spacing for minimum-width shapes.
    fn space(&self, layer: &str) -> Result<f64>;
    /// Minimum width of any shape on `layer`.
    fn min_width(&self, layer: &str) -> Result<f64>;
    /// Minimum area of any shape on `layer`. Zero if unconstrained.
    fn min_area(&self, layer: &str) -> Result<f64>;
    /// Minimum spacing between a shape of width `max_width` and a shape of width
    /// `min_width` running in parallel for `run_length`.
    fn space_by_width_and_length(
        &self,
        layer: &str,
        max_width: f64,
        min_width: f64,
        run_length: f64,
    ) -> Result<f64>;
}

/// A row of a width- and run-length-dependent spacing table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpaceRule {
    /// Applies to shapes at least this wide
    pub width: f64,
    /// Applies to parallel runs at least this long
    #[serde(default)]
    pub length: f64,
    pub space: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerRules {
    #[serde(default)]
    pub desc: String,
    pub width: f64,
    pub space: f64,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub space_table: Vec<SpaceRule>,
}

/// Parameters of a transistor's source/drain contact stack.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TxFillParams {
    /// Metal layer landing on the contacts
    pub metal: ArcStr,
    pub contact_width: f64,
    pub contact_space: f64,
    /// Enclosure of a contact by active, along the device width
    pub active_enclosure: f64,
    /// Enclosure of the contact stack by metal, along the device width
    pub metal_enclosure: f64,
    /// Distance between adjacent source/drain contact columns
    pub contact_pitch: f64,
    /// Contact stacks taller than this need no metal fill
    pub minwidth_fill: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TechConfig {
    pub tech: String,
    pub grid: f64,
    #[serde(default = "default_poly_layer")]
    pub poly_layer: ArcStr,
    /// Layers whose shapes must be reconciled when two cells abut
    #[serde(default)]
    pub abutment_layers: Vec<LayerSpec>,
    layers: HashMap<String, LayerRules>,
    #[serde(default)]
    tx_fill: Option<TxFillParams>,
}

fn default_poly_layer() -> ArcStr {
    arcstr::literal!("poly")
}

impl TechConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let txt = std::fs::read_to_string(path)?;
        Self::from_toml(&txt)
    }

    /// Parse and validate a TOML rule set.
    pub fn from_toml(s: &str) -> Result<Self> {
        let tc: Self = toml::from_str(s)?;
        tc.validate()?;
        Ok(tc)
    }

    /// Check every value is usable, and that every referenced layer has rules.
    pub fn validate(&self) -> Result<()> {
        if !(self.grid.is_finite() && self.grid > 0.) {
            return Err(FillError::InvalidRuleQuery(format!(
                "grid must be positive, got {}",
                self.grid
            )));
        }
        for (name, rules) in self.layers.iter() {
            let values = [rules.width, rules.space, rules.area]
                .into_iter()
                .chain(
                    rules
                        .space_table
                        .iter()
                        .flat_map(|r| [r.width, r.length, r.space]),
                );
            for v in values {
                if !v.is_finite() || v < 0. {
                    return Err(FillError::InvalidRuleQuery(format!(
                        "layer `{name}` has invalid rule value {v}"
                    )));
                }
            }
        }
        for spec in self.abutment_layers.iter() {
            self.layer(&spec.layer)?;
        }
        if let Some(tx) = &self.tx_fill {
            self.layer(&tx.metal)?;
        }
        Ok(())
    }

    pub fn layer(&self, l: &str) -> Result<&LayerRules> {
        self.layers
            .get(l)
            .ok_or_else(|| FillError::UnknownLayer(l.to_string()))
    }

    pub fn tx_fill(&self) -> Result<&TxFillParams> {
        self.tx_fill.as_ref().ok_or(FillError::MissingRules("tx_fill"))
    }
}

impl DesignRules for TechConfig {
    fn grid(&self) -> Grid {
        Grid::new(self.grid)
    }

    fn poly_layer(&self) -> &str {
        &self.poly_layer
    }

    fn abutment_layers(&self) -> &[LayerSpec] {
        &self.abutment_layers
    }

    fn space(&self, layer: &str) -> Result<f64> {
        Ok(self.layer(layer)?.space)
    }

    fn min_width(&self, layer: &str) -> Result<f64> {
        Ok(self.layer(layer)?.width)
    }

    fn min_area(&self, layer: &str) -> Result<f64> {
        Ok(self.layer(layer)?.area)
    }

    /// The largest table spacing whose width and run-length thresholds are met,
    /// or the base spacing if no row applies.
    fn space_by_width_and_length(
        &self,
        layer: &str,
        max_width: f64,
        min_width: f64,
        run_length: f64,
    ) -> Result<f64> {
        if min_width > max_width {
            return Err(FillError::InvalidRuleQuery(format!(
                "min_width {min_width} exceeds max_width {max_width} on `{layer}`"
            )));
        }
        let rules = self.layer(layer)?;
        let space = rules
            .space_table
            .iter()
            .filter(|r| max_width >= r.width && run_length >= r.length)
            .map(|r| r.space)
            .reduce(f64::max);
        match space {
            Some(space) => Ok(space.max(rules.space)),
            None => {
                if !rules.space_table.is_empty() {
                    log::trace!(
                        "{layer}: no spacing rule for width {max_width}, run length {run_length}; using base space {}",
                        rules.space
                    );
                }
                Ok(rules.space)
            }
        }
    }
}

/// Look up a built-in technology by name.
pub fn builtin(name: &str) -> Result<TechConfig> {
    match name {
        "sky130" | "sky130A" => Ok(sky130::tech_config().clone()),
        _ => Err(FillError::UnknownTech(name.to_string())),
    }
}

/// Load `name_or_path` as a built-in technology name, or failing that, as a path to a TOML file.
pub fn resolve(name_or_path: &str) -> Result<TechConfig> {
    match builtin(name_or_path) {
        Ok(tc) => Ok(tc),
        Err(FillError::UnknownTech(_)) if Path::new(name_or_path).exists() => {
            TechConfig::load(name_or_path)
        }
        Err(e) => Err(e),
    }
}
