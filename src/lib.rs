//! # slicing_floorplan
//!
//! `slicing_floorplan` evaluates slicing floorplans written as
//! Normalized Polish Expressions (NPEs).  Cells come from a *cell
//! library*: each cell has a single character name, an area, an aspect
//! ratio, and may or may not be rotated.
//!
//! An expression such as `12V3H` is turned into a slicing tree, and the
//! shape curves of the subtrees are combined bottom up to find the
//! smallest bounding rectangle the arrangement allows.  The winning
//! shape is then pushed back down the tree so every cell gets a concrete
//! width, height and position.
//!
//! The `cost` function is the quantity an NPE search (simulated
//! annealing, for example) would minimize; `evaluate` also returns the
//! placement, which can be written out as PostScript.
pub mod cell;
pub mod error;
pub mod floorplan;
pub mod npe;
pub mod shape;
pub mod slicing_tree;

pub use cell::{Cell, CellLibrary};
pub use error::{FloorplanError, NpeViolation, Result};
pub use floorplan::{cost, evaluate, Floorplan, PlacedCell};
pub use npe::{is_valid, Cut, Npe};
pub use slicing_tree::SlicingTree;
