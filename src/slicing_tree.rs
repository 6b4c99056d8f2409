//! Slicing trees.
//!
//! Nodes live in a single vector and refer to each other by index.  The
//! root is the first node allocated.  Operator nodes are cuts with a
//! left and right child; operand nodes are cells from the library.
//!
//! Evaluation runs bottom up: every operator combines the shape curves
//! of its children and remembers its smallest-area shape.  Selection
//! then runs top down from the root's best shape, following the origin
//! indices to fix the shape every node (and so every cell) takes.
use std::fmt;

use log::{debug, trace};

use crate::cell::CellLibrary;
use crate::error::{FloorplanError, NpeViolation, Result};
use crate::npe::{Cut, Npe, Symbol};
use crate::shape::{Shape, ShapeCurve};

pub type NodeId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// `cell` is the index into the cell library.
    Operand { name: char, cell: usize },
    Operator(Cut),
}

#[derive(Clone, Debug)]
pub struct SlicingNode {
    pub kind: NodeKind,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
    pub shapes: ShapeCurve,
    /// Smallest-area shape of this subtree, once evaluated.
    pub selected: Option<usize>,
    /// Shape fixed by selection from the root.
    pub chosen: Option<usize>,
    pub area: f32,
    pub aspect_ratio: f32,
}

impl SlicingNode {
    fn new(kind: NodeKind, shapes: ShapeCurve) -> SlicingNode {
        SlicingNode {
            kind,
            left: None,
            right: None,
            parent: None,
            shapes,
            selected: None,
            chosen: None,
            area: 0.0,
            aspect_ratio: 0.0,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, NodeKind::Operator(_))
    }

    pub fn symbol(&self) -> char {
        match self.kind {
            NodeKind::Operand { name, .. } => name,
            NodeKind::Operator(cut) => cut.symbol(),
        }
    }

    fn is_cell(&self, cell_name: char) -> bool {
        matches!(self.kind, NodeKind::Operand { name, .. } if name == cell_name)
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|i| self.shapes.get(i))
    }

    pub fn chosen_shape(&self) -> Option<&Shape> {
        self.chosen.and_then(|i| self.shapes.get(i))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slot {
    Right,
    Left,
}

pub struct SlicingTree<'a> {
    library: &'a CellLibrary,
    nodes: Vec<SlicingNode>,
    root: NodeId,
}

impl<'a> SlicingTree<'a> {
    /// Validates `npe` and builds its tree.
    pub fn new(npe: &str, library: &'a CellLibrary) -> Result<SlicingTree<'a>> {
        let npe = Npe::parse(npe)?;
        SlicingTree::build(&npe, library)
    }

    /// Builds the tree for an expression, scanning it from the back.
    ///
    /// The last symbol is the root.  Each symbol after that becomes a
    /// child of the current operator, filling the right slot first.  A
    /// new operator becomes the current node.  Once an operand fills a
    /// left slot that subtree is complete, and the scan climbs back to
    /// the nearest ancestor still missing its left child.
    pub fn build(npe: &Npe, library: &'a CellLibrary) -> Result<SlicingTree<'a>> {
        let mut tree = SlicingTree {
            library,
            nodes: Vec::with_capacity(npe.len()),
            root: 0,
        };
        let mut symbols = npe.symbols().iter().rev().enumerate();

        let mut current = match symbols.next() {
            Some((_, Symbol::Operator(cut))) => tree.add_operator(*cut),
            Some((_, Symbol::Operand(name))) => {
                // A lone cell is its own floorplan.
                tree.add_operand(*name)?;
                return Ok(tree);
            }
            None => return Err(invalid(npe, NpeViolation::Empty)),
        };

        for (back, sym) in symbols {
            let position = npe.len() - 1 - back;
            match *sym {
                Symbol::Operator(cut) => {
                    let id = tree.add_operator(cut);
                    tree.attach(current, id)
                        .ok_or_else(|| invalid(npe, NpeViolation::Ballot { position }))?;
                    current = id;
                }
                Symbol::Operand(name) => {
                    let id = tree.add_operand(name)?;
                    let slot = tree
                        .attach(current, id)
                        .ok_or_else(|| invalid(npe, NpeViolation::Ballot { position }))?;
                    if slot == Slot::Left {
                        while current != tree.root && tree.nodes[current].left.is_some() {
                            match tree.nodes[current].parent {
                                Some(p) => current = p,
                                None => break,
                            }
                        }
                    }
                }
            }
        }

        if !tree.is_full_binary() {
            return Err(invalid(
                npe,
                NpeViolation::OperandCount {
                    operands: tree.operand_count(),
                    operators: tree.operator_count(),
                },
            ));
        }
        debug!(
            "Built slicing tree for {}: {} cells, {} cuts",
            npe,
            tree.operand_count(),
            tree.operator_count()
        );
        Ok(tree)
    }

    fn add_operator(&mut self, cut: Cut) -> NodeId {
        self.nodes
            .push(SlicingNode::new(NodeKind::Operator(cut), ShapeCurve::new()));
        self.nodes.len() - 1
    }

    fn add_operand(&mut self, name: char) -> Result<NodeId> {
        let cell = self
            .library
            .cell_index(name)
            .ok_or(FloorplanError::CellNotFound(name))?;
        let shapes = self.library.cells()[cell].shapes();
        self.nodes
            .push(SlicingNode::new(NodeKind::Operand { name, cell }, shapes));
        Ok(self.nodes.len() - 1)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Option<Slot> {
        let p = &mut self.nodes[parent];
        let slot = if p.right.is_none() {
            p.right = Some(child);
            Slot::Right
        } else if p.left.is_none() {
            p.left = Some(child);
            Slot::Left
        } else {
            return None;
        };
        self.nodes[child].parent = Some(parent);
        Some(slot)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SlicingNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[SlicingNode] {
        &self.nodes
    }

    pub fn library(&self) -> &'a CellLibrary {
        self.library
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn operand_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_operator()).count()
    }

    pub fn operator_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_operator()).count()
    }

    /// Every operator has two children, cells have none, and every node
    /// but the root hangs off its parent.
    pub fn is_full_binary(&self) -> bool {
        for (id, n) in self.nodes.iter().enumerate() {
            let children_ok = match (n.is_operator(), n.left, n.right) {
                (true, Some(l), Some(r)) => {
                    self.nodes[l].parent == Some(id) && self.nodes[r].parent == Some(id)
                }
                (false, None, None) => true,
                _ => false,
            };
            if !children_ok || (id == self.root) != n.parent.is_none() {
                return false;
            }
        }
        self.operator_count() + 1 == self.operand_count()
    }

    /// Smallest area the subtree at `id` can take.  Each node's curve is
    /// computed once; later calls return the stored result.
    pub fn compute_min_area(&mut self, id: NodeId) -> f32 {
        // Pre-order with the right child first; reversed, every node
        // comes after both of its children.
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if self.nodes[n].selected.is_some() {
                continue;
            }
            order.push(n);
            if let (Some(l), Some(r)) = (self.nodes[n].left, self.nodes[n].right) {
                stack.push(l);
                stack.push(r);
            }
        }
        for n in order.into_iter().rev() {
            self.settle(n);
        }
        self.nodes[id].area
    }

    /// Builds the curve of `id` from its evaluated children and picks
    /// its best shape.
    fn settle(&mut self, id: NodeId) {
        if let NodeKind::Operator(cut) = self.nodes[id].kind {
            let (left, right) = match (self.nodes[id].left, self.nodes[id].right) {
                (Some(l), Some(r)) => (l, r),
                _ => unreachable!("cut node {} is missing a child", id),
            };
            let curve = ShapeCurve::combine(cut, &self.nodes[right].shapes, &self.nodes[left].shapes);
            self.nodes[id].shapes = curve;
        }

        let node = &mut self.nodes[id];
        if let Some(best) = node.shapes.best() {
            let s = node.shapes.shapes()[best];
            node.selected = Some(best);
            node.area = s.area();
            node.aspect_ratio = s.aspect_ratio();
            trace!(
                "Node {} ({}): {} shapes, best {}",
                id,
                node.symbol(),
                node.shapes.len(),
                s
            );
        }
    }

    /// Minimum area of the whole floorplan.
    pub fn evaluate(&mut self) -> f32 {
        let root = self.root;
        self.compute_min_area(root)
    }

    /// Fixes the shape of every node, starting from the root's best
    /// shape.  Evaluates the tree first if needed.
    pub fn select(&mut self) {
        self.evaluate();
        let root = self.root;
        let best = match self.nodes[root].selected {
            Some(b) => b,
            None => return,
        };
        let mut stack = vec![(root, best)];
        while let Some((id, index)) = stack.pop() {
            let node = &mut self.nodes[id];
            node.chosen = Some(index);
            let origin = node.shapes.get(index).and_then(|s| s.origin);
            if let (Some(o), Some(l), Some(r)) = (origin, node.left, node.right) {
                stack.push((r, o.right));
                stack.push((l, o.left));
            }
        }
    }

    pub fn chosen_shape(&self, id: NodeId) -> Option<&Shape> {
        self.nodes[id].chosen_shape()
    }

    /// Chosen width and height of the named cell, after `select`.
    pub fn leaf_shape(&self, name: char) -> Option<&Shape> {
        self.nodes
            .iter()
            .find(|n| n.is_cell(name))
            .and_then(|n| n.chosen_shape())
    }

    /// Symbols in postfix order: left subtree, right subtree, node.
    pub fn postfix(&self) -> Vec<char> {
        let mut out = Vec::with_capacity(self.nodes.len());
        if self.nodes.is_empty() {
            return out;
        }
        // Node, right, left; reversed this is postfix.
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let n = &self.nodes[id];
            out.push(n.symbol());
            if let Some(l) = n.left {
                stack.push(l);
            }
            if let Some(r) = n.right {
                stack.push(r);
            }
        }
        out.reverse();
        out
    }
}

/// Prints the tree back as a Normalized Polish Expression.
impl fmt::Display for SlicingTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in self.postfix() {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

fn invalid(npe: &Npe, reason: NpeViolation) -> FloorplanError {
    FloorplanError::InvalidExpression {
        npe: npe.to_string(),
        reason,
    }
}
