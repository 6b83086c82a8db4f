use crate::error::{FillError, Result};
use crate::geom::{Dir, Purpose, Rect, Side};
use crate::grid::Interval;
use crate::layout::{Instance, ShapeSource};
use crate::tech::DesignRules;

use super::{resolve_layers, FillReport, NoFill};

/// Close the gaps between well and implant shapes at the facing edges of two stacked instances.
///
/// `dir` is the stacking axis: for [Dir::Vert] `target` sits above `source`,
/// for [Dir::Horiz] it sits to the right.
/// Only shapes within one layer spacing of the facing boundary take part.
/// Each pair overlapping by more than the layer's minimum width across the stacking axis
/// gets a rectangle spanning the gap between them, over that overlap.
pub fn well_implant_instance_fills(
    source: &Instance,
    target: &Instance,
    dir: Dir,
    layers: Option<&[&str]>,
    purposes: Option<&[Purpose]>,
    rules: &(impl DesignRules + ?Sized),
) -> Result<FillReport<Rect>> {
    let grid = rules.grid();
    let cross = !dir;
    let src_far = source.extent(dir).end;
    let tgt_near = target.extent(dir).start;
    let mut report = FillReport::default();

    for spec in resolve_layers(rules, layers, purposes)? {
        let space = rules.space(&spec.layer)?;
        let min_width = rules.min_width(&spec.layer)?;

        let src_shapes: Vec<Rect> = source
            .layer_shapes(&spec.layer, &spec.purpose, true)
            .into_iter()
            .filter(|r| r.span(dir).end >= src_far - space)
            .collect();
        let tgt_shapes: Vec<Rect> = target
            .layer_shapes(&spec.layer, &spec.purpose, true)
            .into_iter()
            .filter(|r| r.span(dir).start <= tgt_near + space)
            .collect();
        if src_shapes.iter().chain(tgt_shapes.iter()).any(|r| !r.is_finite()) {
            return Err(FillError::NonFinite("shape"));
        }
        if src_shapes.is_empty() {
            report.skip(&spec, NoFill::MissingShapes(Side::from_dir_sign(dir, 1.)));
            continue;
        }
        if tgt_shapes.is_empty() {
            report.skip(&spec, NoFill::MissingShapes(Side::from_dir_sign(dir, -1.)));
            continue;
        }

        let before = report.fills.len();
        for s in src_shapes.iter() {
            for t in tgt_shapes.iter() {
                let overlap = match s.span(cross).intersection(&t.span(cross)) {
                    Some(overlap) if overlap.length() > min_width => overlap,
                    _ => continue,
                };
                let gap = Interval {
                    start: grid.round_to_grid(s.span(dir).end),
                    end: grid.round_to_grid(t.span(dir).start),
                };
                if gap.is_empty() {
                    continue;
                }
                let overlap = grid.round_interval(overlap);
                let (hspan, vspan) = match dir {
                    Dir::Horiz => (gap, overlap),
                    Dir::Vert => (overlap, gap),
                };
                let fill = Rect::from_spans(spec.layer.clone(), spec.purpose.clone(), hspan, vspan);
                log::trace!("{spec}: gap fill {:?} {}x{}", fill.offset, fill.width, fill.height);
                report.fills.push(fill);
            }
        }
        if report.fills.len() == before {
            report.skip(&spec, NoFill::NoOverlap);
        }
    }
    Ok(report)
}
