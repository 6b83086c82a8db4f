//!
//! # Host Layout
//!
//! The [Module] a cell generator draws into, the [Instance]s it places,
//! and the [ShapeSource] seam through which the clearance finder and fill
//! synthesizer read their shape snapshots.
//!

use std::path::Path;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geom::{Dir, Point, Purpose, Rect, Transform};
use crate::grid::Interval;

pub mod instance;
pub use instance::Instance;

/// Anything that can report the shapes it contains.
///
/// Shapes are returned in the frame of the source's *placer*:
/// a [Module] reports in its own frame, an [Instance] in its parent's.
pub trait ShapeSource {
    /// Shapes on `layer` with purpose `purpose`.
    /// When `recursive` is set, shapes of nested instances are flattened in.
    fn layer_shapes(&self, layer: &str, purpose: &Purpose, recursive: bool) -> Vec<Rect>;

    /// The span of the source's boundary along `dir`.
    fn extent(&self, dir: Dir) -> Interval;
}

/// # Layout Module
///
/// Primitive rectangles and placed instances, bounded by the box
/// `(0, 0)` to `(width, height)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    pub name: ArcStr,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub rects: Vec<Rect>,
    #[serde(default)]
    pub insts: Vec<Instance>,
}

impl Module {
    /// Create a new and empty [Module] named `name`
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the module boundary. Consumes and returns `self` for chainability.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Add a drawing rectangle with lower-left corner `offset`.
    pub fn add_rect(
        &mut self,
        layer: impl Into<ArcStr>,
        offset: Point,
        width: f64,
        height: f64,
    ) -> &Rect {
        self.push_rect(Rect::new(layer, offset, width, height))
    }

    /// Add a drawing rectangle centered on `center`.
    pub fn add_rect_center(
        &mut self,
        layer: impl Into<ArcStr>,
        center: Point,
        width: f64,
        height: f64,
    ) -> &Rect {
        self.push_rect(Rect::from_center(layer, center, width, height))
    }

    /// Add an already-constructed rectangle of any purpose.
    pub fn push_rect(&mut self, rect: Rect) -> &Rect {
        self.rects.push(rect);
        &self.rects[self.rects.len() - 1]
    }

    pub fn add_inst(&mut self, inst: Instance) -> &Instance {
        self.insts.push(inst);
        &self.insts[self.insts.len() - 1]
    }

    /// Read a module from a JSON layout snapshot.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let txt = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&txt)?)
    }

    /// Flatten all shapes, including those of nested instances, into this module's frame.
    pub fn flatten(&self) -> Vec<Rect> {
        let mut rects = Vec::new();
        flatten_helper(self, &Transform::identity(), &mut rects);
        rects
    }

    /// Grow the module boundary to cover every flattened shape
    /// lying at non-negative coordinates.
    pub fn fit_to_contents(&mut self) {
        for r in self.flatten() {
            self.width = self.width.max(r.right());
            self.height = self.height.max(r.top());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.insts.is_empty()
    }
}

impl ShapeSource for Module {
    fn layer_shapes(&self, layer: &str, purpose: &Purpose, recursive: bool) -> Vec<Rect> {
        let mut shapes: Vec<Rect> = self
            .rects
            .iter()
            .filter(|r| r.is_on(layer, purpose))
            .cloned()
            .collect();
        if recursive {
            for inst in self.insts.iter() {
                shapes.extend(inst.layer_shapes(layer, purpose, true));
            }
        }
        shapes
    }

    fn extent(&self, dir: Dir) -> Interval {
        match dir {
            Dir::Horiz => Interval::new(0., self.width),
            Dir::Vert => Interval::new(0., self.height),
        }
    }
}

/// Internal helper and core logic for [Module::flatten].
fn flatten_helper(module: &Module, trans: &Transform, rects: &mut Vec<Rect>) {
    rects.extend(module.rects.iter().map(|r| r.transform(trans)));
    for inst in module.insts.iter() {
        let trans = Transform::cascade(trans, &inst.transform());
        flatten_helper(&inst.module, &trans, rects);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::FillError;
    use crate::geom::{Mirror, Rotation};

    fn leaf() -> Arc<Module> {
        let mut m = Module::new("leaf").with_size(2., 1.);
        m.add_rect("m1", Point::new(0., 0.), 1., 1.);
        m.push_rect(Rect::new("poly", Point::new(1., 0.), 0.5, 1.).with_purpose(Purpose::Dummy));
        Arc::new(m)
    }

    #[test]
    fn test_layer_shapes_filters_purpose() {
        let m = leaf();
        assert_eq!(m.layer_shapes("m1", &Purpose::Drawing, false).len(), 1);
        assert_eq!(m.layer_shapes("poly", &Purpose::Drawing, false).len(), 0);
        assert_eq!(m.layer_shapes("poly", &Purpose::Dummy, false).len(), 1);
    }

    #[test]
    fn test_layer_shapes_recursive() {
        let mut top = Module::new("top").with_size(10., 10.);
        top.add_rect("m1", Point::new(5., 5.), 1., 1.);
        top.add_inst(Instance::new("x0", leaf()).with_offset(Point::new(3., 0.)));
        top.add_inst(
            Instance::new("x1", leaf())
                .with_offset(Point::new(8., 2.))
                .with_mirror(Mirror::MY),
        );

        assert_eq!(top.layer_shapes("m1", &Purpose::Drawing, false).len(), 1);

        let shapes = top.layer_shapes("m1", &Purpose::Drawing, true);
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[1], Rect::new("m1", Point::new(3., 0.), 1., 1.));
        // Mirrored about the y-axis: x in [0, 1] lands on [7, 8].
        assert_eq!(shapes[2], Rect::new("m1", Point::new(7., 2.), 1., 1.));
    }

    #[test]
    fn test_flatten_nested_rotation() {
        let mut mid = Module::new("mid").with_size(2., 2.);
        mid.add_inst(Instance::new("leaf", leaf()).with_rotation(Rotation::R90));
        let mut top = Module::new("top");
        top.add_inst(Instance::new("mid", Arc::new(mid)).with_offset(Point::new(10., 0.)));

        let flat = top.flatten();
        assert_eq!(flat.len(), 2);
        // (0,0)-(1,1) rotated a quarter turn spans x in [-1, 0].
        assert_eq!(flat[0], Rect::new("m1", Point::new(9., 0.), 1., 1.));

        top.fit_to_contents();
        assert_eq!(top.width, 10.);
        assert_eq!(top.height, 1.5);
    }

    #[test]
    fn test_add_rect_center() {
        let mut m = Module::new("m");
        let r = m.add_rect_center("m1", Point::new(1., 1.), 2., 4.).clone();
        assert_eq!(r.offset, Point::new(0., -1.));
        assert_eq!(m.rects.len(), 1);
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.json");
        std::fs::write(&path, serde_json::to_string(&*leaf()).unwrap()).unwrap();
        let m = Module::load(&path).unwrap();
        assert_eq!(m.name.as_str(), "leaf");
        assert_eq!(m.rects.len(), 2);

        std::fs::write(&path, "{\"name\": ").unwrap();
        assert!(matches!(Module::load(&path), Err(FillError::Json(_))));
        assert!(matches!(
            Module::load(dir.path().join("missing.json")),
            Err(FillError::Io(_))
        ));
    }
}
