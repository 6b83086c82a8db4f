//! Greedy rectangle deduplication.

use log::trace;

use crate::geom::{Dir, Rect};

/// The bounding box of `a` and `b`, on `a`'s layer and purpose.
pub fn combine_rects(a: &Rect, b: &Rect) -> Rect {
    let h = a.span(Dir::Horiz);
    let v = a.span(Dir::Vert);
    Rect::from_edges(
        a.layer.clone(),
        a.purpose.clone(),
        h.start.min(b.left()),
        v.start.min(b.bottom()),
        h.end.max(b.right()),
        v.end.max(b.top()),
    )
}

/// Collapse rectangles lying within `min_space` of one another.
///
/// Single forward pass: each input is grown by `min_space` and compared against the
/// rectangles accepted so far. The first accepted rectangle it touches is replaced by
/// the bounding box of the two; otherwise the input is accepted as is.
///
/// The pass is first-fit and order dependent. Accepted rectangles are never re-merged
/// with each other, so two outputs may still lie within `min_space` after a union grows.
pub fn extract_unique_rects(rects: &[Rect], min_space: f64) -> Vec<Rect> {
    let mut out: Vec<Rect> = Vec::with_capacity(rects.len());
    for rect in rects {
        let reach = rect.expand(min_space);
        match out.iter_mut().find(|r| r.overlaps(&reach)) {
            Some(accepted) => {
                trace!("merging {:?} into {:?}", rect.offset, accepted.offset);
                *accepted = combine_rects(rect, accepted);
            }
            None => out.push(rect.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point, Purpose};

    fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect::from_edges("nwell", Purpose::Drawing, x0, y0, x1, y1)
    }

    #[test]
    fn test_combine_rects() {
        let a = Rect::new("m1", Point::new(0., 0.), 1., 1.).with_purpose(Purpose::Dummy);
        let b = Rect::new("m2", Point::new(2., -1.), 1., 1.);
        let c = combine_rects(&a, &b);
        assert_eq!(c.layer.as_str(), "m1");
        assert_eq!(c.purpose, Purpose::Dummy);
        assert_eq!((c.left(), c.bottom(), c.right(), c.top()), (0., -1., 3., 1.));
    }

    #[test]
    fn test_merge_within_spacing() {
        let rects = vec![r(0., 0., 2., 2.), r(3., 0., 5., 2.)];
        assert_eq!(extract_unique_rects(&rects, 2.), vec![r(0., 0., 5., 2.)]);
        assert_eq!(extract_unique_rects(&rects, 0.), rects);
    }

    #[test]
    fn test_duplicates_collapse() {
        let rects = vec![r(0., 0., 1., 1.), r(0., 0., 1., 1.), r(0.5, 0., 1., 1.)];
        assert_eq!(extract_unique_rects(&rects, 0.), vec![r(0., 0., 1., 1.)]);
    }

    #[test]
    fn test_every_input_covered() {
        let rects = vec![
            r(0., 0., 1., 1.),
            r(10., 0., 11., 1.),
            r(1.5, 0., 2., 1.),
            r(20., 5., 21., 6.),
        ];
        let out = extract_unique_rects(&rects, 1.);
        assert_eq!(out.len(), 3);
        for rect in rects.iter() {
            assert!(out.iter().any(|o| o.left() <= rect.left()
                && o.right() >= rect.right()
                && o.bottom() <= rect.bottom()
                && o.top() >= rect.top()));
        }
    }

    #[test]
    fn test_first_fit_is_order_dependent() {
        // `bridge` touches both outer rectangles once grown.
        let left = r(0., 0., 1., 1.);
        let right = r(4., 0., 5., 1.);
        let bridge = r(2., 0., 3., 1.);

        let bridge_last = extract_unique_rects(&[left.clone(), right.clone(), bridge.clone()], 1.);
        assert_eq!(bridge_last, vec![r(0., 0., 3., 1.), right.clone()]);

        let bridge_first = extract_unique_rects(&[bridge, left, right], 1.);
        assert_eq!(bridge_first, vec![r(0., 0., 5., 1.)]);
    }
}
