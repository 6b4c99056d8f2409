//! The cell library: named rectangular blocks with an area and an
//! aspect ratio (height / width).  Cells are read from a plain text
//! file, one cell per line:
//!
//! ```text
//! # name area aspect [fixed|free]
//! a 12.0 0.5
//! b 30.0 2.0 fixed
//! ```
//!
//! Cells without a fourth field may be rotated by 90 degrees.
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};
use scan_fmt::scan_fmt;

use crate::error::{FloorplanError, Result};
use crate::npe::Cut;
use crate::shape::{Shape, ShapeCurve};

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub name: char,
    pub area: f32,
    pub aspect_ratio: f32,
    pub fixed: bool,
}

impl Cell {
    pub fn new(name: char, area: f32, aspect_ratio: f32, fixed: bool) -> Cell {
        Cell {
            name,
            area,
            aspect_ratio,
            fixed,
        }
    }

    /// A cell that may be rotated.
    pub fn free(name: char, area: f32, aspect_ratio: f32) -> Cell {
        Cell::new(name, area, aspect_ratio, false)
    }

    /// A cell that keeps its orientation.
    pub fn fixed(name: char, area: f32, aspect_ratio: f32) -> Cell {
        Cell::new(name, area, aspect_ratio, true)
    }

    /// Width and height in the cell's own orientation.
    pub fn natural_shape(&self) -> Shape {
        let h = (self.aspect_ratio * self.area).sqrt();
        let w = self.area / h;
        Shape::new(w, h)
    }

    pub fn shapes(&self) -> ShapeCurve {
        ShapeCurve::for_cell(self.natural_shape(), !self.fixed)
    }

    fn check(&self) -> Result<()> {
        if Cut::from_symbol(self.name).is_some() {
            return Err(FloorplanError::ReservedName(self.name));
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if self.name.is_whitespace() || !positive(self.area) || !positive(self.aspect_ratio) {
            return Err(FloorplanError::InvalidCell { name: self.name });
        }
        Ok(())
    }
}

/// Cells in file order, with a lookup from name to index.  Cells only
/// come in through `add`, which keeps the two in step.
#[derive(Clone, Debug, Default)]
pub struct CellLibrary {
    cells: Vec<Cell>,
    cell_map: HashMap<char, usize>,
}

impl CellLibrary {
    pub fn new() -> CellLibrary {
        CellLibrary {
            cells: Vec::new(),
            cell_map: HashMap::new(),
        }
    }

    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Result<CellLibrary> {
        let mut lib = CellLibrary::new();
        for c in cells {
            lib.add(c)?;
        }
        Ok(lib)
    }

    pub fn add(&mut self, cell: Cell) -> Result<usize> {
        cell.check()?;
        if self.cell_map.contains_key(&cell.name) {
            return Err(FloorplanError::DuplicateCell(cell.name));
        }
        let idx = self.cells.len();
        self.cell_map.insert(cell.name, idx);
        self.cells.push(cell);
        Ok(idx)
    }

    pub fn cell_index(&self, name: char) -> Option<usize> {
        self.cell_map.get(&name).copied()
    }

    pub fn get(&self, name: char) -> Option<&Cell> {
        self.cell_index(name).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_area(&self) -> f32 {
        self.cells.iter().map(|c| c.area).sum()
    }

    pub fn read(filepath: &Path) -> Result<CellLibrary> {
        info!("Opening {}", filepath.to_string_lossy());
        let f = File::open(filepath).map_err(|source| FloorplanError::Io {
            path: filepath.to_path_buf(),
            source,
        })?;
        let reader = BufReader::with_capacity(32000, f);
        let lib = CellLibrary::parse(reader).map_err(|e| match e {
            FloorplanError::Io { source, .. } => FloorplanError::Io {
                path: filepath.to_path_buf(),
                source,
            },
            e => e,
        })?;
        info!(
            "Cell library has {} cells, total area {}",
            lib.len(),
            lib.cell_area()
        );
        Ok(lib)
    }

    pub fn parse<R: BufRead>(reader: R) -> Result<CellLibrary> {
        let mut lib = CellLibrary::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| FloorplanError::Io {
                path: Default::default(),
                source,
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cell = parse_record(line).ok_or_else(|| FloorplanError::Parse {
                line: lineno + 1,
                text: line.to_string(),
            })?;
            debug!(
                "Cell {} area {} aspect {}{}",
                cell.name,
                cell.area,
                cell.aspect_ratio,
                if cell.fixed { " fixed" } else { "" }
            );
            lib.add(cell)?;
        }
        Ok(lib)
    }
}

fn parse_record(line: &str) -> Option<Cell> {
    // scan_fmt stops reading after the last placeholder.
    if line.split_whitespace().count() > 4 {
        return None;
    }
    let (name, area, aspect, fixed) =
        if let Ok((n, a, r, flag)) = scan_fmt!(line, "{} {} {} {}", String, f32, f32, String) {
            let fixed = match flag.as_str() {
                "fixed" => true,
                "free" => false,
                _ => return None,
            };
            (n, a, r, fixed)
        } else if let Ok((n, a, r)) = scan_fmt!(line, "{} {} {}", String, f32, f32) {
            (n, a, r, false)
        } else {
            return None;
        };

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Cell::new(c, area, aspect, fixed)),
        _ => None,
    }
}
