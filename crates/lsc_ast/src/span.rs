//! Source positions.
//!
//! Every node carries a [`Span`] pointing back into the original source
//! text. Synthesized nodes inherit a span from a reference node so that
//! downstream source-map generation can always find a home for them;
//! a span that could not be derived is the explicit [`Span::MISSING`]
//! sentinel rather than an absent field, so gaps stay detectable.

use serde::{Deserialize, Serialize};

/// A 1-based line / 0-based column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Byte offsets plus line/column coordinates for both ends of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub start_loc: LineCol,
    pub end_loc: LineCol,
}

impl Span {
    /// The explicit "no good position exists" sentinel.
    pub const MISSING: Span = Span {
        start: u32::MAX,
        end: u32::MAX,
        start_loc: LineCol { line: 0, column: 0 },
        end_loc: LineCol { line: 0, column: 0 },
    };

    pub fn new(start: u32, end: u32, start_loc: LineCol, end_loc: LineCol) -> Span {
        Span {
            start,
            end,
            start_loc,
            end_loc,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.start == u32::MAX && self.end == u32::MAX
    }

    /// Zero-width span at this span's start.
    pub fn collapse_to_start(self) -> Span {
        Span {
            start: self.start,
            end: self.start,
            start_loc: self.start_loc,
            end_loc: self.start_loc,
        }
    }

    /// Zero-width span at this span's end.
    pub fn collapse_to_end(self) -> Span {
        Span {
            start: self.end,
            end: self.end,
            start_loc: self.end_loc,
            end_loc: self.end_loc,
        }
    }
}

impl Default for Span {
    fn default() -> Span {
        Span::MISSING
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_missing() {
            write!(f, "<missing>")
        } else {
            write!(f, "{}:{}", self.start_loc.line, self.start_loc.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_is_detectable() {
        assert!(Span::MISSING.is_missing());
        assert!(Span::default().is_missing());
        let s = Span::new(
            0,
            4,
            LineCol { line: 1, column: 0 },
            LineCol { line: 1, column: 4 },
        );
        assert!(!s.is_missing());
    }

    #[test]
    fn collapse_keeps_anchor() {
        let s = Span::new(
            3,
            9,
            LineCol { line: 1, column: 3 },
            LineCol { line: 1, column: 9 },
        );
        let before = s.collapse_to_start();
        assert_eq!(before.start, 3);
        assert_eq!(before.end, 3);
        let after = s.collapse_to_end();
        assert_eq!(after.start, 9);
        assert_eq!(after.end_loc, s.end_loc);
    }
}
