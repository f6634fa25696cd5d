//! Source positions and program points.
//!
//! ESTree positions are 1-based lines and 0-based columns. The engine orders
//! chain entries by a single integer program point (`Loc`) computed from a
//! position and made relative to the start of the scope that owns it.

use crate::limits::COLUMN_SPAN;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line/column position in the source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.column)
    }
}

/// Start and end positions of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    pub const fn new(start: Position, end: Position) -> Self {
        SourceLocation { start, end }
    }

    /// Whether `other` lies within this location (inclusive bounds).
    pub fn contains(&self, other: &SourceLocation) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// An ordered program point.
///
/// Locations inside a scope are offsets from the scope's base location, so a
/// function body's entries are ordered independently of where the function
/// sits in the file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Loc(pub i64);

impl Loc {
    /// Hoisted declarations are visible from the start of their scope.
    pub const HOISTED: Loc = Loc(0);
    /// Injected library values precede every real location.
    pub const LIBRARY: Loc = Loc(-1);
    /// Entries added without a location follow every real location.
    pub const UNORDERED: Loc = Loc(i64::MAX);

    /// Absolute program point of a position. Lines beyond the encodable
    /// range saturate to [`Loc::UNORDERED`].
    pub fn from_position(position: Position) -> Loc {
        Loc(i64::from(position.line)
            .saturating_mul(COLUMN_SPAN)
            .saturating_add(i64::from(position.column)))
    }

    /// This location made relative to `base`.
    pub fn relative_to(self, base: Loc) -> Loc {
        Loc(self.0 - base.0)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Loc::LIBRARY => f.write_str("library"),
            Loc::UNORDERED => f.write_str("unordered"),
            Loc(value) => write!(f, "{}:{}", value / COLUMN_SPAN, value % COLUMN_SPAN),
        }
    }
}

#[cfg(test)]
#[path = "tests/position_tests.rs"]
mod position_tests;
