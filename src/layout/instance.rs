use std::sync::Arc;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::geom::{Dir, Mirror, Point, Purpose, Rect, Rotation, Side, Transform};
use crate::grid::Interval;

use super::{Module, ShapeSource};

/// Instance of another [Module]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Instance Name
    pub name: ArcStr,
    /// Module Definition Reference
    pub module: Arc<Module>,
    /// Location of the module origin,
    /// regardless of rotation or reflection
    #[serde(default)]
    pub offset: Point,
    /// Reflection, applied *before* rotation
    #[serde(default)]
    pub mirror: Mirror,
    /// Counter-clockwise rotation, applied *after* reflection
    #[serde(default)]
    pub rotation: Rotation,
}

impl Instance {
    pub fn new(name: impl Into<ArcStr>, module: Arc<Module>) -> Self {
        Self {
            name: name.into(),
            module,
            offset: Point::zero(),
            mirror: Mirror::R0,
            rotation: Rotation::R0,
        }
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// The transform taking module coordinates into the parent frame.
    pub fn transform(&self) -> Transform {
        Transform::from_instance(&self.offset, self.mirror, self.rotation)
    }

    /// The module boundary, transformed into the parent frame.
    pub fn boundary(&self) -> Rect {
        Rect::new(
            self.module.name.clone(),
            Point::zero(),
            self.module.width,
            self.module.height,
        )
        .transform(&self.transform())
    }

    /// The side of the placed instance that module side `side` ends up facing.
    pub fn placed_side(&self, side: Side) -> Side {
        let sign = side.sign();
        // Follow the outward normal of `side` through the (translation-free) matrix.
        let normal = Point::along(side.dir(), sign);
        let t = Transform {
            b: [0., 0.],
            ..self.transform()
        };
        let out = normal.transform(&t);
        if out.x.abs() > out.y.abs() {
            Side::from_dir_sign(Dir::Horiz, out.x)
        } else {
            Side::from_dir_sign(Dir::Vert, out.y)
        }
    }
}

impl ShapeSource for Instance {
    fn layer_shapes(&self, layer: &str, purpose: &Purpose, recursive: bool) -> Vec<Rect> {
        let trans = self.transform();
        self.module
            .layer_shapes(layer, purpose, recursive)
            .iter()
            .map(|r| r.transform(&trans))
            .collect()
    }

    fn extent(&self, dir: Dir) -> Interval {
        self.boundary().span(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> Arc<Module> {
        Arc::new(Module::new("cell").with_size(4., 2.))
    }

    #[test]
    fn test_boundary() {
        let inst = Instance::new("x", cell()).with_offset(Point::new(1., 1.));
        assert_eq!(inst.extent(Dir::Horiz), Interval::new(1., 5.));
        assert_eq!(inst.extent(Dir::Vert), Interval::new(1., 3.));

        let rot = Instance::new("x", cell())
            .with_offset(Point::new(2., 0.))
            .with_rotation(Rotation::R90);
        assert_eq!(rot.extent(Dir::Horiz), Interval::new(0., 2.));
        assert_eq!(rot.extent(Dir::Vert), Interval::new(0., 4.));
    }

    #[test]
    fn test_placed_side() {
        let inst = Instance::new("x", cell());
        assert_eq!(inst.placed_side(Side::Left), Side::Left);

        let r90 = inst.clone().with_rotation(Rotation::R90);
        assert_eq!(r90.placed_side(Side::Right), Side::Top);
        assert_eq!(r90.placed_side(Side::Left), Side::Bottom);

        let r270 = inst.clone().with_rotation(Rotation::R270);
        assert_eq!(r270.placed_side(Side::Right), Side::Bottom);
        assert_eq!(r270.placed_side(Side::Left), Side::Top);

        let my90 = inst.with_mirror(Mirror::MY).with_rotation(Rotation::R90);
        assert_eq!(my90.placed_side(Side::Left), Side::Top);
    }
}
