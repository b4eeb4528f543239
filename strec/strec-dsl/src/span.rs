use std::fmt::{self, Debug, Formatter};
use std::ops::Range;

use serde::Serialize;

/// A half-open byte range into the program source. DSL programs come from a
/// single `-e`/`-f` source, so no source id is carried.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn merge(a: Span, b: Span) -> Span {
        Span {
            start: usize::min(a.start, b.start),
            end: usize::max(a.end, b.end),
        }
    }

    /// 1-based (line, column) of the span start, for error messages.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let upto = &source[..self.start.min(source.len())];
        let line = upto.bytes().filter(|b| *b == b'\n').count() + 1;
        let col = upto.rfind('\n').map_or(self.start + 1, |i| self.start - i);
        (line, col)
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Span {
            start: r.start,
            end: r.end,
        }
    }
}

impl From<Span> for Range<usize> {
    fn from(s: Span) -> Self {
        s.start..s.end
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "a = 1;\nb = 2;\n";
        assert_eq!(Span { start: 0, end: 1 }.line_col(source), (1, 1));
        assert_eq!(Span { start: 7, end: 8 }.line_col(source), (2, 1));
        assert_eq!(Span { start: 11, end: 12 }.line_col(source), (2, 5));
    }
}
