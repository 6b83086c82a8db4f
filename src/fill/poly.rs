use log::{debug, trace};

use crate::error::{FillError, Result};
use crate::geom::{Dir, Point, Purpose, Rect, Side};
use crate::layout::{Instance, Module, ShapeSource};
use crate::tech::DesignRules;

use super::{NoFill, Outcome};

impl Module {
    /// Re-project the dummy poly of a quarter-turn-rotated `reference` instance
    /// beyond its `direction` edge.
    ///
    /// Dummy poly runs along the child's left and right edges. Once the instance is
    /// rotated, one of those sides faces `direction` ([Side::Top] or [Side::Bottom]);
    /// its dummies are moved outward by their own thickness plus the widest real poly
    /// of the child, grid rounded, and added to this module.
    ///
    /// Returns the added rectangles.
    pub fn fill_horizontal_poly(
        &mut self,
        reference: &Instance,
        direction: Side,
        rules: &(impl DesignRules + ?Sized),
    ) -> Result<Outcome<Vec<Rect>>> {
        if direction.dir() != Dir::Vert {
            return Err(FillError::InvalidSide(direction));
        }
        if !reference.rotation.is_quarter_turn() {
            return Ok(Outcome::Skip(NoFill::NotRotated));
        }
        let side = match [Side::Left, Side::Right]
            .into_iter()
            .find(|s| reference.placed_side(*s) == direction)
        {
            Some(side) => side,
            None => return Ok(Outcome::Skip(NoFill::NotRotated)),
        };

        let child = &reference.module;
        let poly = rules.poly_layer();
        let mid = child.width / 2.;
        let dummies: Vec<Rect> = child
            .layer_shapes(poly, &Purpose::Dummy, true)
            .into_iter()
            .filter(|r| match side {
                Side::Left => r.center().x < mid,
                _ => r.center().x > mid,
            })
            .collect();
        if dummies.is_empty() {
            return Ok(Outcome::Skip(NoFill::NoDummies));
        }
        let widest = child
            .layer_shapes(poly, &Purpose::Drawing, true)
            .iter()
            .map(|r| r.width)
            .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))));
        let widest = match widest {
            Some(w) => w,
            None => return Ok(Outcome::Skip(NoFill::NoRealPoly)),
        };

        let grid = rules.grid();
        let trans = reference.transform();
        let mut added = Vec::with_capacity(dummies.len());
        for dummy in dummies.iter() {
            if !dummy.is_finite() {
                return Err(FillError::NonFinite("shape"));
            }
            let shift = Point::along(Dir::Vert, direction.sign() * (dummy.width + widest));
            let placed = grid.round_rect(&dummy.transform(&trans).translate(shift));
            trace!(
                "{}: {side} dummy poly moved to {:?}",
                reference.name,
                placed.offset
            );
            let rect = self
                .add_rect(poly, placed.offset, placed.width, placed.height)
                .clone();
            added.push(rect);
        }
        debug!(
            "{}: {} dummy poly shapes re-projected {} of {}",
            self.name,
            added.len(),
            direction,
            reference.name
        );
        Ok(Outcome::Fill(added))
    }
}
