use arcstr::ArcStr;
use log::debug;

use crate::error::{FillError, Result};
use crate::geom::{Point, Rect};
use crate::tech::{DesignRules, TxFillParams};

use super::{NoFill, Outcome};

/// Slack when counting how many contacts fit, so exact fits are not lost to rounding.
const CONTACT_FIT_TOLERANCE: f64 = 1e-9;

/// Metal patch widening a transistor's source/drain contact stack.
///
/// Coordinates are along the device width, measured from the edge of active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxMetalFill {
    pub y_bottom: f64,
    pub y_top: f64,
    pub width: f64,
    pub height: f64,
}

impl TxMetalFill {
    /// The fill as a rectangle on `layer`, centered horizontally on `x_center`.
    pub fn rect(&self, layer: impl Into<ArcStr>, x_center: f64) -> Rect {
        Rect::new(
            layer,
            Point::new(x_center - self.width / 2., self.y_bottom),
            self.width,
            self.height,
        )
    }
}

/// Number of contacts fitting along a device of width `tx_width`. Always at least one.
pub fn max_contacts(tx_width: f64, params: &TxFillParams) -> usize {
    let avail = tx_width - 2. * params.active_enclosure + params.contact_space;
    let n = (avail / (params.contact_width + params.contact_space) + CONTACT_FIT_TOLERANCE).floor();
    if n >= 1. {
        n as usize
    } else {
        1
    }
}

/// Height of the metal covering a stack of `n` contacts.
pub fn contact_stack_height(n: usize, params: &TxFillParams) -> f64 {
    let n = n as f64;
    n * params.contact_width + (n - 1.) * params.contact_space + 2. * params.metal_enclosure
}

/// Size the metal fill a transistor of width `tx_width` needs over its contact stack.
///
/// Wide devices whose stack already exceeds `params.minwidth_fill` need none.
/// Otherwise the fill is as wide as the contact pitch allows after the
/// width-dependent spacing to its neighbor, and tall enough for minimum area.
pub fn calculate_tx_metal_fill(
    tx_width: f64,
    rules: &(impl DesignRules + ?Sized),
    params: &TxFillParams,
) -> Result<Outcome<TxMetalFill>> {
    if !tx_width.is_finite() {
        return Err(FillError::NonFinite("transistor width"));
    }
    let grid = rules.grid();
    let metal = params.metal.as_str();

    let n = max_contacts(tx_width, params);
    let stack = contact_stack_height(n, params);
    if stack > params.minwidth_fill {
        debug!("tx width {tx_width}: {n} contacts, stack {stack} needs no fill");
        return Ok(Outcome::Skip(NoFill::ContactStackSufficient {
            height: stack,
            limit: params.minwidth_fill,
        }));
    }

    let min_width = rules.min_width(metal)?;
    let min_area = rules.min_area(metal)?;

    // First guess at the width, using the base spacing.
    let w0 = params.contact_pitch - rules.space(metal)?;
    if w0 < min_width {
        return Ok(Outcome::Skip(NoFill::BelowMinimum {
            width: w0,
            min_width,
        }));
    }
    let run_length = stack.max(min_area / w0);
    let space = rules.space_by_width_and_length(metal, w0, min_width, run_length)?;
    let width = grid.round_to_grid(params.contact_pitch - space);
    if width < min_width {
        return Ok(Outcome::Skip(NoFill::BelowMinimum { width, min_width }));
    }

    let height = grid
        .ceil_to_grid(min_area / width)
        .max(grid.ceil_to_grid(stack));
    // Round one end only, so `y_top - y_bottom` stays exactly `height`.
    let y_bottom = grid.round_to_grid(tx_width / 2. - height / 2.);
    let fill = TxMetalFill {
        y_bottom,
        y_top: y_bottom + height,
        width,
        height,
    };
    debug!("tx width {tx_width}: {n} contacts, fill {fill:?}");
    Ok(Outcome::Fill(fill))
}
