//!
//! # Clearance Finder
//!
//! Open space along one axis of a [Module], after subtracting every shape on a layer.
//!

use arcstr::ArcStr;
use derive_builder::Builder;
use log::{debug, trace};

use crate::error::{FillError, Result};
use crate::geom::{Dir, Purpose};
use crate::grid::{ranges_overlap, Grid, Interval};
use crate::layout::{Instance, Module, ShapeSource};

/// Parameters of a [find_clearances] query.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Debug))]
pub struct ClearanceQuery<'a> {
    /// Layer whose shapes obstruct
    #[builder(setter(into))]
    pub layer: ArcStr,
    #[builder(default)]
    pub purpose: Purpose,
    /// Axis along which open intervals are reported
    pub dir: Dir,
    /// Intervals to narrow, instead of the module's full extent along `dir`
    #[builder(default, setter(strip_option))]
    pub existing: Option<Vec<Interval>>,
    /// Span on the orthogonal axis within which shapes obstruct.
    /// Defaults to the module's full orthogonal extent.
    #[builder(default, setter(strip_option))]
    pub region: Option<Interval>,
    /// Whether shapes of nested instances obstruct
    #[builder(default = "true")]
    pub recursive: bool,
    /// Sibling instances whose (flattened) shapes also obstruct
    #[builder(default)]
    pub aux_instances: Vec<&'a Instance>,
}

impl<'a> ClearanceQuery<'a> {
    #[inline]
    pub fn builder() -> ClearanceQueryBuilder<'a> {
        ClearanceQueryBuilder::default()
    }
}

/// Find the open intervals along `query.dir` not covered by any shape on `query.layer`.
///
/// Shape extents are grid rounded before subtraction.
/// The result is disjoint and sorted by start.
pub fn find_clearances(
    module: &Module,
    query: &ClearanceQuery<'_>,
    grid: Grid,
) -> Result<Vec<Interval>> {
    let dir = query.dir;
    let region = match query.region {
        Some(region) => {
            if !region.start.is_finite() || !region.end.is_finite() {
                return Err(FillError::NonFinite("region"));
            }
            if region.start > region.end {
                return Err(FillError::InvalidRegion {
                    start: region.start,
                    end: region.end,
                });
            }
            region
        }
        None => module.extent(!dir),
    };

    let mut open = match &query.existing {
        Some(existing) => {
            for interval in existing.iter() {
                interval.validate()?;
            }
            existing.clone()
        }
        None => vec![module.extent(dir)],
    };
    open.retain(|i| !i.is_empty());

    let mut obstructions = module.layer_shapes(&query.layer, &query.purpose, query.recursive);
    for inst in query.aux_instances.iter() {
        obstructions.extend(inst.layer_shapes(&query.layer, &query.purpose, true));
    }

    for shape in obstructions.iter() {
        if !shape.is_finite() {
            return Err(FillError::NonFinite("shape"));
        }
        if shape.is_degenerate() {
            trace!("skipping zero-area {} shape at {:?}", shape.layer, shape.offset);
            continue;
        }
        if !ranges_overlap(grid.axis_extent(shape, !dir), region) {
            trace!("skipping {} shape outside region {:?}", shape.layer, region);
            continue;
        }
        open = subtract(open, grid.axis_extent(shape, dir));
    }

    open.sort_by(|a, b| a.start.total_cmp(&b.start));
    debug!(
        "{} clearances on {}/{} along {}: {} shapes, {} open",
        module.name,
        query.layer,
        query.purpose,
        dir,
        obstructions.len(),
        open.len()
    );
    Ok(open)
}

/// Remove `obs` from each interval it touches.
fn subtract(open: Vec<Interval>, obs: Interval) -> Vec<Interval> {
    open.into_iter()
        .flat_map(|int| {
            if !ranges_overlap(int, obs) {
                return vec![int];
            }
            let mut pieces = Vec::with_capacity(2);
            if obs.start >= int.start {
                pieces.push(Interval {
                    start: int.start,
                    end: obs.start,
                });
            }
            pieces.push(Interval {
                start: obs.end,
                end: int.end,
            });
            pieces
        })
        .filter(|i| !i.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::geom::Point;

    fn grid() -> Grid {
        Grid::new(0.005)
    }

    fn module_with(obstructions: &[(f64, f64)]) -> Module {
        let mut m = Module::new("host").with_size(10., 10.);
        for &(x0, x1) in obstructions {
            m.add_rect("m1", Point::new(x0, 0.), x1 - x0, 1.);
        }
        m
    }

    fn horiz<'a>() -> ClearanceQueryBuilder<'a> {
        let mut b = ClearanceQuery::builder();
        b.layer("m1").dir(Dir::Horiz);
        b
    }

    fn iv(start: f64, end: f64) -> Interval {
        Interval { start, end }
    }

    #[test]
    fn test_single_obstruction() {
        let m = module_with(&[(3., 5.)]);
        let out = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
        assert_eq!(out, vec![iv(0., 3.), iv(5., 10.)]);
    }

    #[test]
    fn test_order_independent() {
        let expected = vec![iv(0., 1.), iv(2., 3.), iv(5., 10.)];
        for obs in [[(3., 5.), (1., 2.)], [(1., 2.), (3., 5.)]] {
            let m = module_with(&obs);
            let out = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
            assert_eq!(out, expected);

            // No reported interval runs through the interior of an obstruction.
            for (x0, x1) in obs {
                for i in out.iter() {
                    assert!(i.end <= x0 || i.start >= x1);
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let m = module_with(&[(3., 5.), (1., 2.)]);
        let first = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
        let again = find_clearances(
            &m,
            &horiz().existing(first.clone()).build().unwrap(),
            grid(),
        )
        .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_existing_narrows() {
        let m = module_with(&[(3., 5.)]);
        let q = horiz().existing(vec![iv(0., 4.), iv(6., 8.)]).build().unwrap();
        let out = find_clearances(&m, &q, grid()).unwrap();
        assert_eq!(out, vec![iv(0., 3.), iv(6., 8.)]);
    }

    #[test]
    fn test_obstruction_overhangs_start() {
        let m = module_with(&[(-1., 2.)]);
        let out = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
        assert_eq!(out, vec![iv(2., 10.)]);
    }

    #[test]
    fn test_zero_area_shapes_ignored() {
        let mut m = module_with(&[(3., 3.), (6., 8.)]);
        m.add_rect("m1", Point::new(1., 0.), 1., 0.);
        let out = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
        assert_eq!(out, vec![iv(0., 6.), iv(8., 10.)]);
        assert!(!ranges_overlap(out[0], out[1]));
    }

    #[test]
    fn test_region_filter() {
        let mut m = module_with(&[]);
        m.add_rect("m1", Point::new(3., 8.), 2., 1.);
        m.add_rect("m1", Point::new(6., 5.), 1., 1.);

        let q = horiz().region(iv(0., 5.)).build().unwrap();
        let out = find_clearances(&m, &q, grid()).unwrap();
        // The shape at y = 8 is outside; the one touching y = 5 is not.
        assert_eq!(out, vec![iv(0., 6.), iv(7., 10.)]);

        let all = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
        assert_eq!(all, vec![iv(0., 3.), iv(5., 6.), iv(7., 10.)]);
    }

    #[test]
    fn test_vertical() {
        let mut m = module_with(&[]);
        m.add_rect("m1", Point::new(0., 2.), 1., 0.5);
        let q = ClearanceQuery::builder()
            .layer("m1")
            .dir(Dir::Vert)
            .build()
            .unwrap();
        let out = find_clearances(&m, &q, grid()).unwrap();
        assert_eq!(out, vec![iv(0., 2.), iv(2.5, 10.)]);
    }

    #[test]
    fn test_recursive_and_aux_instances() {
        let mut leaf = Module::new("leaf").with_size(1., 1.);
        leaf.add_rect("m1", Point::new(0., 0.), 1., 1.);
        let leaf = Arc::new(leaf);

        let mut m = module_with(&[]);
        m.add_inst(Instance::new("x0", leaf.clone()).with_offset(Point::new(2., 0.)));
        let sibling = Instance::new("x1", leaf).with_offset(Point::new(7., 0.));

        let flat = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
        assert_eq!(flat, vec![iv(0., 2.), iv(3., 10.)]);

        let shallow = horiz().recursive(false).build().unwrap();
        assert_eq!(
            find_clearances(&m, &shallow, grid()).unwrap(),
            vec![iv(0., 10.)]
        );

        let with_aux = horiz().aux_instances(vec![&sibling]).build().unwrap();
        assert_eq!(
            find_clearances(&m, &with_aux, grid()).unwrap(),
            vec![iv(0., 2.), iv(3., 7.), iv(8., 10.)]
        );
    }

    #[test]
    fn test_purpose_filter() {
        let mut m = module_with(&[]);
        m.push_rect(
            crate::geom::Rect::new("m1", Point::new(3., 0.), 1., 1.).with_purpose(Purpose::Pin),
        );
        let drawing = find_clearances(&m, &horiz().build().unwrap(), grid()).unwrap();
        assert_eq!(drawing, vec![iv(0., 10.)]);
        let pin = horiz().purpose(Purpose::Pin).build().unwrap();
        assert_eq!(
            find_clearances(&m, &pin, grid()).unwrap(),
            vec![iv(0., 3.), iv(4., 10.)]
        );
    }

    #[test]
    fn test_invalid_input() {
        let m = module_with(&[(3., 5.)]);
        let q = horiz().region(iv(5., 1.)).build().unwrap();
        assert!(matches!(
            find_clearances(&m, &q, grid()),
            Err(FillError::InvalidRegion { .. })
        ));

        let q = horiz().region(iv(0., f64::NAN)).build().unwrap();
        assert!(matches!(
            find_clearances(&m, &q, grid()),
            Err(FillError::NonFinite(_))
        ));

        let q = horiz().existing(vec![iv(4., 2.)]).build().unwrap();
        assert!(matches!(
            find_clearances(&m, &q, grid()),
            Err(FillError::InvalidInterval { .. })
        ));

        assert!(ClearanceQuery::builder().layer("m1").build().is_err());
    }
}
