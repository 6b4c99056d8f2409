//! Floorplan evaluation: the cost of an expression, and the concrete
//! placement it stands for.
//!
//! Cells are placed from the lower left corner.  A vertical cut puts
//! its right child to the right of the left child; a horizontal cut
//! stacks the right child on top of the left child.
use std::fmt;

use log::{debug, info};
use pstools::point;
use pstools::PSTool;

use crate::cell::CellLibrary;
use crate::error::{FloorplanError, Result};
use crate::npe::Cut;
use crate::slicing_tree::{NodeKind, SlicingTree};

/// Minimum bounding area of `npe` over `cells`.
pub fn cost(npe: &str, cells: &CellLibrary) -> Result<f32> {
    let mut tree = SlicingTree::new(npe, cells)?;
    let area = tree.evaluate();
    debug!("Cost of {} is {}", npe, area);
    Ok(area)
}

/// Evaluates `npe` and places every cell.
pub fn evaluate(npe: &str, cells: &CellLibrary) -> Result<Floorplan> {
    let mut tree = SlicingTree::new(npe, cells)?;
    Ok(Floorplan::from_tree(&mut tree))
}

#[derive(Clone)]
pub struct PlacedCell {
    pub name: char,
    /// Lower left corner.
    pub pos: point::Point,
    pub width: f32,
    pub height: f32,
    pub rotated: bool,
}

impl PlacedCell {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    fn overlaps(&self, other: &PlacedCell, eps: f32) -> bool {
        self.pos.x + eps < other.pos.x + other.width
            && other.pos.x + eps < self.pos.x + self.width
            && self.pos.y + eps < other.pos.y + other.height
            && other.pos.y + eps < self.pos.y + self.height
    }
}

#[derive(Clone)]
pub struct Floorplan {
    pub npe: String,
    pub width: f32,
    pub height: f32,
    pub area: f32,
    pub cell_area: f32,
    /// In cell library order.
    pub cells: Vec<PlacedCell>,
}

impl Floorplan {
    pub fn from_tree(tree: &mut SlicingTree) -> Floorplan {
        tree.select();

        let root = tree.root();
        let (width, height) = tree
            .chosen_shape(root)
            .map(|s| (s.width, s.height))
            .unwrap_or((0.0, 0.0));

        let mut placed: Vec<(usize, PlacedCell)> = Vec::with_capacity(tree.operand_count());
        let mut stack = vec![(root, 0.0f32, 0.0f32)];
        while let Some((id, x, y)) = stack.pop() {
            let node = tree.node(id);
            let shape = match node.chosen_shape() {
                Some(s) => *s,
                None => continue,
            };
            match node.kind {
                NodeKind::Operand { name, cell } => {
                    placed.push((
                        cell,
                        PlacedCell {
                            name,
                            pos: point::Point { x, y },
                            width: shape.width,
                            height: shape.height,
                            rotated: node.chosen != Some(0),
                        },
                    ));
                }
                NodeKind::Operator(cut) => {
                    if let (Some(l), Some(r)) = (node.left, node.right) {
                        let left = tree.chosen_shape(l).copied().unwrap_or(shape);
                        let (rx, ry) = match cut {
                            Cut::Vertical => (x + left.width, y),
                            Cut::Horizontal => (x, y + left.height),
                        };
                        stack.push((l, x, y));
                        stack.push((r, rx, ry));
                    }
                }
            }
        }
        placed.sort_by_key(|(cell, _)| *cell);

        let fp = Floorplan {
            npe: tree.to_string(),
            width,
            height,
            area: tree.node(root).area,
            cell_area: placed.iter().map(|(_, p)| p.area()).sum(),
            cells: placed.into_iter().map(|(_, p)| p).collect(),
        };
        info!(
            "Floorplan {}: {} x {}, area {}, utilization {}",
            fp.npe,
            fp.width,
            fp.height,
            fp.area,
            fp.utilization()
        );
        fp
    }

    /// Fraction of the bounding box covered by cells.
    pub fn utilization(&self) -> f32 {
        if self.area > 0.0 {
            self.cell_area / self.area
        } else {
            0.0
        }
    }

    pub fn dead_space(&self) -> f32 {
        self.area - self.cell_area
    }

    pub fn cell(&self, name: char) -> Option<&PlacedCell> {
        self.cells.iter().find(|c| c.name == name)
    }

    /// True if every cell lies inside the bounding box and no two cells
    /// overlap.  Edges may disagree by rounding, since positions and the
    /// bounding box sum the same widths in different orders.
    pub fn is_legal(&self) -> bool {
        let eps = self.width.max(self.height) * 1e-5;
        for (i, a) in self.cells.iter().enumerate() {
            if a.pos.x < -eps
                || a.pos.y < -eps
                || a.pos.x + a.width > self.width + eps
                || a.pos.y + a.height > self.height + eps
            {
                return false;
            }
            if self.cells[i + 1..].iter().any(|b| a.overlaps(b, eps)) {
                return false;
            }
        }
        true
    }

    pub fn ps_cells(&self, pst: &mut PSTool) {
        for c in &self.cells {
            if c.rotated {
                pst.set_color(0.8, 0.4, 0.1, 1.0);
            } else {
                pst.set_color(0.1, 0.1, 0.8, 1.0);
            }
            pst.add_box(c.pos.x, c.pos.y, c.pos.x + c.width, c.pos.y + c.height);
        }
    }

    pub fn ps_labels(&self, pst: &mut PSTool) {
        pst.set_color(0.1, 0.1, 0.0, 1.0);
        for c in &self.cells {
            pst.add_text(
                c.pos.x + c.width / 2.0,
                c.pos.y + c.height / 2.0,
                c.name.to_string(),
            );
        }
    }

    pub fn postscript(&self, filename: String) -> Result<()> {
        let mut pst = PSTool::new();

        pst.set_color(0.6, 0.6, 0.6, 1.0);
        pst.add_box(0.0, 0.0, self.width, self.height);
        self.ps_cells(&mut pst);
        self.ps_labels(&mut pst);

        pst.set_border(40.0);
        info!("Writing floorplan to {}", filename);
        pst.generate(filename)
            .map(|_| ())
            .map_err(|e| FloorplanError::Render(format!("{:?}", e)))
    }
}

impl fmt::Display for Floorplan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "NPE: {}", self.npe)?;
        writeln!(
            f,
            "Bounding box {} x {}, area {}",
            self.width, self.height, self.area
        )?;
        writeln!(
            f,
            "Cell area {}, dead space {}, utilization {:.3}",
            self.cell_area,
            self.dead_space(),
            self.utilization()
        )?;
        for c in &self.cells {
            writeln!(
                f,
                "  {} at ({}, {}) size {} x {}{}",
                c.name,
                c.pos.x,
                c.pos.y,
                c.width,
                c.height,
                if c.rotated { " rotated" } else { "" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::error::NpeViolation;

    fn two_squares() -> CellLibrary {
        CellLibrary::from_cells(vec![Cell::fixed('A', 4.0, 1.0), Cell::fixed('B', 9.0, 1.0)])
            .unwrap()
    }

    #[test]
    fn cost_of_simple_cuts() {
        let lib = two_squares();
        assert_eq!(cost("ABV", &lib).unwrap(), 15.0);
        assert_eq!(cost("ABH", &lib).unwrap(), 15.0);
        assert_eq!(cost("A", &lib).unwrap(), 4.0);
    }

    #[test]
    fn cost_rejects_bad_input() {
        let lib = two_squares();
        match cost("AAV", &lib) {
            Err(FloorplanError::InvalidExpression { reason, .. }) => assert_eq!(
                reason,
                NpeViolation::DuplicateOperand {
                    symbol: 'A',
                    position: 1
                }
            ),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            cost("ACV", &lib),
            Err(FloorplanError::CellNotFound('C'))
        ));
    }

    #[test]
    fn vertical_placement() {
        let fp = evaluate("ABV", &two_squares()).unwrap();
        assert_eq!((fp.width, fp.height, fp.area), (5.0, 3.0, 15.0));
        let a = fp.cell('A').unwrap();
        let b = fp.cell('B').unwrap();
        assert_eq!((a.pos.x, a.pos.y, a.width, a.height), (0.0, 0.0, 2.0, 2.0));
        assert_eq!((b.pos.x, b.pos.y, b.width, b.height), (2.0, 0.0, 3.0, 3.0));
        assert_eq!(fp.cell_area, 13.0);
        assert_eq!(fp.dead_space(), 2.0);
        assert!(fp.is_legal());
    }

    #[test]
    fn horizontal_placement() {
        let fp = evaluate("ABH", &two_squares()).unwrap();
        assert_eq!((fp.width, fp.height), (3.0, 5.0));
        let b = fp.cell('B').unwrap();
        assert_eq!((b.pos.x, b.pos.y), (0.0, 2.0));
        assert!(!b.rotated);
        assert!(fp.is_legal());
        assert_eq!(fp.npe, "ABH");
    }

    #[test]
    fn rotated_cells_are_flagged() {
        let lib = CellLibrary::from_cells(vec![Cell::fixed('A', 2.0, 0.5), Cell::free('B', 2.0, 2.0)])
            .unwrap();
        let fp = evaluate("ABH", &lib).unwrap();
        assert_eq!(fp.area, 4.0);
        assert!(!fp.cell('A').unwrap().rotated);
        assert!(fp.cell('B').unwrap().rotated);
        assert_eq!(fp.utilization(), 1.0);
        assert!(fp.is_legal());
    }

    #[test]
    fn cells_follow_library_order() {
        let lib = CellLibrary::from_cells("ABCD".chars().map(|c| Cell::free(c, 2.0, 0.5))).unwrap();
        let fp = evaluate("DCVBHAV", &lib).unwrap();
        let names: String = fp.cells.iter().map(|c| c.name).collect();
        assert_eq!(names, "ABCD");
        assert!(fp.is_legal());
        assert!(fp.to_string().starts_with("NPE: DCVBHAV\n"));
    }
}
