//! Normalized Polish Expressions.
//!
//! An NPE is the postfix form of a slicing tree.  Operands are single
//! character cell names; `V` and `H` are vertical and horizontal cuts.
//! An expression is normalized when no two neighbouring operators are
//! the same, and valid when it satisfies the balloting property: reading
//! left to right, operands always outnumber operators, and at the end
//! there is exactly one more operand than operators.
//!
//! Whitespace is not part of the alphabet and is skipped, so `"AB V"`
//! and `"ABV"` are the same expression.
use std::collections::HashSet;
use std::fmt;

use crate::error::{FloorplanError, NpeViolation, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cut {
    Vertical,
    Horizontal,
}

impl Cut {
    pub fn from_symbol(c: char) -> Option<Cut> {
        match c {
            'V' => Some(Cut::Vertical),
            'H' => Some(Cut::Horizontal),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cut::Vertical => 'V',
            Cut::Horizontal => 'H',
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    Operand(char),
    Operator(Cut),
}

impl Symbol {
    pub fn from_char(c: char) -> Symbol {
        match Cut::from_symbol(c) {
            Some(cut) => Symbol::Operator(cut),
            None => Symbol::Operand(c),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::Operand(c) => c,
            Symbol::Operator(cut) => cut.symbol(),
        }
    }
}

fn symbols(npe: &str) -> impl Iterator<Item = Symbol> + '_ {
    npe.chars()
        .filter(|c| !c.is_whitespace())
        .map(Symbol::from_char)
}

/// Checks an expression in one left to right pass, reporting the first
/// rule it breaks.
pub fn validate(npe: &str) -> std::result::Result<(), NpeViolation> {
    let mut operands = 0usize;
    let mut operators = 0usize;
    let mut seen = HashSet::new();
    let mut previous: Option<Symbol> = None;

    for (position, sym) in symbols(npe).enumerate() {
        match sym {
            Symbol::Operator(_) => {
                if previous == Some(sym) {
                    return Err(NpeViolation::RepeatedOperator { position });
                }
                operators += 1;
            }
            Symbol::Operand(c) => {
                if !seen.insert(c) {
                    return Err(NpeViolation::DuplicateOperand {
                        symbol: c,
                        position,
                    });
                }
                operands += 1;
            }
        }
        if operands <= operators {
            return Err(NpeViolation::Ballot { position });
        }
        previous = Some(sym);
    }

    if operands == 0 {
        return Err(NpeViolation::Empty);
    }
    if operators + 1 != operands {
        return Err(NpeViolation::OperandCount {
            operands,
            operators,
        });
    }
    Ok(())
}

/// True if `npe` encodes a slicing tree.
pub fn is_valid(npe: &str) -> bool {
    validate(npe).is_ok()
}

/// A validated expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Npe {
    symbols: Vec<Symbol>,
}

impl Npe {
    pub fn parse(npe: &str) -> Result<Npe> {
        validate(npe).map_err(|reason| FloorplanError::InvalidExpression {
            npe: npe.to_string(),
            reason,
        })?;
        Ok(Npe {
            symbols: symbols(npe).collect(),
        })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn operands(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().filter_map(|s| match s {
            Symbol::Operand(c) => Some(*c),
            _ => None,
        })
    }

    pub fn operand_count(&self) -> usize {
        (self.symbols.len() + 1) / 2
    }
}

impl fmt::Display for Npe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for s in &self.symbols {
            write!(f, "{}", s.as_char())?;
        }
        Ok(())
    }
}
