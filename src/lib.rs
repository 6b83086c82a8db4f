pub use error::{FillError, Result};

pub mod clearance;
pub mod cli;
pub mod error;
pub mod fill;
pub mod geom;
pub mod grid;
pub mod layout;
pub mod merge;
pub mod session;
pub mod tech;

pub use clearance::{find_clearances, ClearanceQuery, ClearanceQueryBuilder};
pub use fill::{
    calculate_tx_metal_fill, create_wells_and_implants_fills, well_implant_instance_fills,
    FillReport, FillSpec, NoFill, Outcome,
};
pub use grid::{ranges_overlap, Grid, Interval};
pub use layout::{Instance, Module, ShapeSource};
pub use merge::{combine_rects, extract_unique_rects};
pub use session::{NameRegistry, Session};
pub use tech::{DesignRules, TechConfig};

#[cfg(test)]
pub(crate) mod tests {
    use crate::tech::{self, TechConfig};

    pub(crate) fn sky130() -> TechConfig {
        tech::builtin("sky130").unwrap()
    }
}
