//! Error kinds shared by the library.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a Normalized Polish Expression was rejected.  Positions are
/// symbol positions (whitespace skipped), counted from zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NpeViolation {
    #[error("expression is empty")]
    Empty,

    #[error("operator repeated at position {position}")]
    RepeatedOperator { position: usize },

    #[error("operand `{symbol}` appears again at position {position}")]
    DuplicateOperand { symbol: char, position: usize },

    #[error("balloting property violated at position {position}")]
    Ballot { position: usize },

    #[error("found {operators} operators for {operands} operands")]
    OperandCount { operands: usize, operators: usize },
}

#[derive(Debug, Error)]
pub enum FloorplanError {
    #[error("invalid NPE `{npe}`: {reason}")]
    InvalidExpression { npe: String, reason: NpeViolation },

    #[error("cell `{0}` not found in the cell library")]
    CellNotFound(char),

    #[error("unable to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed cell record on line {line}: `{text}`")]
    Parse { line: usize, text: String },

    #[error("cell `{0}` defined twice")]
    DuplicateCell(char),

    #[error("`{0}` is a cut operator and cannot name a cell")]
    ReservedName(char),

    #[error("cell `{name}` needs a positive area and aspect ratio")]
    InvalidCell { name: char },

    #[error("postscript output failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, FloorplanError>;
