use itertools::Itertools;

use crate::error::{FillError, Result};
use crate::geom::{Purpose, Side};
use crate::layout::ShapeSource;
use crate::tech::DesignRules;

use super::{resolve_layers, FillReport, FillSpec, NoFill};

/// Match up well and implant shapes across the seam between `left` and `right`.
///
/// For each layer, every left shape is paired with every right shape whose vertical
/// span overlaps it. Pairs whose grid-rounded tops agree are aligned on that top;
/// all others are aligned on the bottom, covering only the band both shapes share.
///
/// Layers default to the technology's abutment layers.
pub fn create_wells_and_implants_fills<L, R>(
    left: &L,
    right: &R,
    layers: Option<&[&str]>,
    purposes: Option<&[Purpose]>,
    rules: &(impl DesignRules + ?Sized),
) -> Result<FillReport<FillSpec>>
where
    L: ShapeSource + ?Sized,
    R: ShapeSource + ?Sized,
{
    let grid = rules.grid();
    let mut report = FillReport::default();

    for spec in resolve_layers(rules, layers, purposes)? {
        let lshapes = left.layer_shapes(&spec.layer, &spec.purpose, true);
        let rshapes = right.layer_shapes(&spec.layer, &spec.purpose, true);
        if lshapes.iter().chain(rshapes.iter()).any(|r| !r.is_finite()) {
            return Err(FillError::NonFinite("shape"));
        }
        if lshapes.is_empty() {
            report.skip(&spec, NoFill::MissingShapes(Side::Left));
            continue;
        }
        if rshapes.is_empty() {
            report.skip(&spec, NoFill::MissingShapes(Side::Right));
            continue;
        }

        let before = report.fills.len();
        for (l, r) in lshapes.iter().cartesian_product(rshapes.iter()) {
            let (lower, higher) = if l.bottom() <= r.bottom() {
                (l, r)
            } else {
                (r, l)
            };
            if lower.top() <= higher.bottom() {
                continue;
            }

            let ltop = grid.round_to_grid(l.top());
            let rtop = grid.round_to_grid(r.top());
            let region_bottom = grid.round_to_grid(l.bottom().max(r.bottom()));
            let (align, region_top) = if ltop == rtop {
                (Side::Top, ltop)
            } else {
                (Side::Bottom, ltop.min(rtop))
            };
            log::trace!("{spec}: aligned on {align}, region [{region_bottom}, {region_top}]");
            report.fills.push(FillSpec {
                layer: spec.clone(),
                region_bottom,
                region_top,
                left: l.clone(),
                right: r.clone(),
                align,
            });
        }
        if report.fills.len() == before {
            report.skip(&spec, NoFill::NoOverlap);
        }
    }
    Ok(report)
}
