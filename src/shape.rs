//! Shape curves.  Every node of a slicing tree can take a set of
//! (width, height) pairs; only the non-dominated ones are worth keeping.
//!
//! A shape produced by a cut remembers which shape of each child it came
//! from, by index into the child's curve.  A curve is only read by its
//! parent once it is complete, so those indices stay valid.
use std::fmt;

use log::trace;

use crate::npe::Cut;

/// Indices into the right and left children's curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShapeOrigin {
    pub right: usize,
    pub left: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct Shape {
    pub width: f32,
    pub height: f32,
    pub origin: Option<ShapeOrigin>,
}

impl Shape {
    pub fn new(width: f32, height: f32) -> Shape {
        Shape {
            width,
            height,
            origin: None,
        }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.height / self.width
    }

    pub fn rotated(&self) -> Shape {
        Shape::new(self.height, self.width)
    }

    /// True if `self` is no larger than `other` in either dimension.
    /// Comparisons are exact.
    pub fn dominates(&self, other: &Shape) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Shape of a node whose right child takes `right` and left child
    /// takes `left`.
    pub fn combine(cut: Cut, right: (usize, &Shape), left: (usize, &Shape)) -> Shape {
        let (ri, r) = right;
        let (li, l) = left;
        let (width, height) = match cut {
            Cut::Vertical => (r.width + l.width, r.height.max(l.height)),
            Cut::Horizontal => (r.width.max(l.width), r.height + l.height),
        };
        Shape {
            width,
            height,
            origin: Some(ShapeOrigin {
                right: ri,
                left: li,
            }),
        }
    }
}

// Two shapes are the same if their dimensions match; the origin is
// bookkeeping only.
impl PartialEq for Shape {
    fn eq(&self, other: &Shape) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// A Pareto frontier of shapes, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct ShapeCurve {
    shapes: Vec<Shape>,
}

impl ShapeCurve {
    pub fn new() -> ShapeCurve {
        ShapeCurve { shapes: Vec::new() }
    }

    /// Shapes a cell can take: its natural orientation, plus the
    /// 90 degree rotation when allowed.
    pub fn for_cell(natural: Shape, can_rotate: bool) -> ShapeCurve {
        let mut curve = ShapeCurve::new();
        curve.insert(natural);
        if can_rotate {
            curve.insert(natural.rotated());
        }
        curve
    }

    /// Adds `shape` unless an existing shape dominates it (an exact
    /// duplicate counts).  Shapes the newcomer dominates are dropped.
    /// Returns true if the shape was added.
    pub fn insert(&mut self, shape: Shape) -> bool {
        if self.shapes.iter().any(|s| s.dominates(&shape)) {
            trace!("Reject dominated shape {}", shape);
            return false;
        }
        self.shapes.retain(|s| !shape.dominates(s));
        self.shapes.push(shape);
        true
    }

    /// Every right/left pairing under `cut`, pruned to the frontier.
    pub fn combine(cut: Cut, right: &ShapeCurve, left: &ShapeCurve) -> ShapeCurve {
        let mut curve = ShapeCurve::new();
        for (i, r) in right.shapes.iter().enumerate() {
            for (j, l) in left.shapes.iter().enumerate() {
                curve.insert(Shape::combine(cut, (i, r), (j, l)));
            }
        }
        trace!(
            "{} cut: {} x {} candidates, {} kept",
            cut.symbol(),
            right.len(),
            left.len(),
            curve.len()
        );
        curve
    }

    /// Index of the smallest-area shape.  Ties go to the earliest shape.
    pub fn best(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, s) in self.shapes.iter().enumerate() {
            let area = s.area();
            match best {
                Some((_, best_area)) if area >= best_area => {}
                _ => best = Some((i, area)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// No shape dominates another.
    pub fn is_frontier(&self) -> bool {
        for (i, a) in self.shapes.iter().enumerate() {
            for (j, b) in self.shapes.iter().enumerate() {
                if i != j && a.dominates(b) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn vertical_adds_widths() {
        let a = Shape::new(2.0, 2.0);
        let b = Shape::new(3.0, 3.0);
        let s = Shape::combine(Cut::Vertical, (0, &b), (0, &a));
        assert_eq!(s.width, 5.0);
        assert_eq!(s.height, 3.0);
        assert_eq!(s.origin, Some(ShapeOrigin { right: 0, left: 0 }));
    }

    #[test]
    fn horizontal_adds_heights() {
        let a = Shape::new(1.0, 4.0);
        let b = Shape::new(2.0, 3.0);
        let s = Shape::combine(Cut::Horizontal, (1, &b), (0, &a));
        assert_eq!(s.width, 2.0);
        assert_eq!(s.height, 7.0);
        assert_eq!(s.origin, Some(ShapeOrigin { right: 1, left: 0 }));
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut curve = ShapeCurve::new();
        assert!(curve.insert(Shape::new(2.0, 3.0)));
        assert!(!curve.insert(Shape::new(2.0, 3.0)));
        assert_eq!(curve.len(), 1);
    }

    #[test]
    fn dominated_shapes_are_dropped() {
        let mut curve = ShapeCurve::new();
        curve.insert(Shape::new(4.0, 1.0));
        curve.insert(Shape::new(1.0, 4.0));
        curve.insert(Shape::new(3.0, 3.0));
        assert_eq!(curve.len(), 3);

        // Dominates (3, 3) only.
        assert!(curve.insert(Shape::new(2.0, 2.0)));
        assert_eq!(curve.len(), 3);
        assert!(!curve.shapes().contains(&Shape::new(3.0, 3.0)));

        assert!(!curve.insert(Shape::new(5.0, 5.0)));
        assert!(curve.is_frontier());
    }

    #[test]
    fn square_cell_has_one_shape() {
        assert_eq!(ShapeCurve::for_cell(Shape::new(2.0, 2.0), true).len(), 1);
        assert_eq!(ShapeCurve::for_cell(Shape::new(1.0, 2.0), true).len(), 2);
        assert_eq!(ShapeCurve::for_cell(Shape::new(1.0, 2.0), false).len(), 1);
    }

    #[test]
    fn best_prefers_first_on_tie() {
        let mut curve = ShapeCurve::new();
        curve.insert(Shape::new(1.0, 6.0));
        curve.insert(Shape::new(2.0, 3.0));
        curve.insert(Shape::new(6.0, 0.5));
        assert_eq!(curve.best(), Some(2));

        let mut tie = ShapeCurve::new();
        tie.insert(Shape::new(1.0, 6.0));
        tie.insert(Shape::new(6.0, 1.0));
        assert_eq!(tie.best(), Some(0));
        assert_eq!(ShapeCurve::new().best(), None);
    }

    #[test]
    fn rotatable_pair_under_vertical_cut() {
        let a = ShapeCurve::for_cell(Shape::new(1.0, 2.0), true);
        let b = ShapeCurve::for_cell(Shape::new(1.0, 2.0), true);
        let curve = ShapeCurve::combine(Cut::Vertical, &b, &a);
        // (2, 2), (3, 2) dominated, (4, 1)
        assert_eq!(curve.len(), 2);
        assert!(curve.shapes().contains(&Shape::new(2.0, 2.0)));
        assert!(curve.shapes().contains(&Shape::new(4.0, 1.0)));
        assert!(curve.is_frontier());
    }

    fn dims() -> impl Strategy<Value = (f32, f32)> {
        (1u8..20, 1u8..20).prop_map(|(w, h)| (w as f32 * 0.5, h as f32 * 0.5))
    }

    proptest! {
        #[test]
        fn insert_keeps_frontier(shapes in prop::collection::vec(dims(), 1..40)) {
            let mut curve = ShapeCurve::new();
            for (w, h) in &shapes {
                curve.insert(Shape::new(*w, *h));
                prop_assert!(curve.is_frontier());
            }
            // Every offered shape is covered by something on the frontier.
            for (w, h) in &shapes {
                let s = Shape::new(*w, *h);
                prop_assert!(curve.shapes().iter().any(|c| c.dominates(&s)));
            }
        }

        #[test]
        fn combined_curve_is_frontier(
            right in prop::collection::vec(dims(), 1..6),
            left in prop::collection::vec(dims(), 1..6),
            vertical in any::<bool>(),
        ) {
            let mut r = ShapeCurve::new();
            right.iter().for_each(|(w, h)| { r.insert(Shape::new(*w, *h)); });
            let mut l = ShapeCurve::new();
            left.iter().for_each(|(w, h)| { l.insert(Shape::new(*w, *h)); });
            let cut = if vertical { Cut::Vertical } else { Cut::Horizontal };
            let curve = ShapeCurve::combine(cut, &r, &l);
            prop_assert!(!curve.is_empty());
            prop_assert!(curve.is_frontier());
            for s in curve.shapes() {
                let origin = s.origin.unwrap();
                prop_assert!(origin.right < r.len());
                prop_assert!(origin.left < l.len());
                prop_assert!(s.area().is_finite() && s.area() > 0.0);
            }
        }
    }
}
