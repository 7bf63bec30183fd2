//! Locations inside term expressions.
//!
//! Terms are short strings embedded in a problem document rather than files, so a span carries
//! the whole term it points into. Diagnostics are rendered from the span alone.

use std::{fmt, ops::Range, sync::Arc};

/// A byte range of a term's source.
#[derive(Clone, PartialEq, Eq)]
pub struct Span {
    pub(crate) source: Arc<str>,
    pub(crate) range: Range<usize>,
}

impl Span {
    pub fn new(source: Arc<str>, range: Range<usize>) -> Self {
        Self { source, range }
    }

    /// The complete term this span points into.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    /// The covered text, or nothing if the range does not fall on character boundaries.
    pub fn as_str(&self) -> &str {
        self.source.get(self.range.clone()).unwrap_or_default()
    }

    /// The span from the start of `self` to the end of `other`, both in the same term.
    pub(crate) fn to(&self, other: &Span) -> Span {
        debug_assert!(Arc::ptr_eq(&self.source, &other.source));
        Span {
            source: Arc::clone(&self.source),
            range: self.range.start..other.range.end,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.as_str(), self.range)
    }
}

pub trait Spanned {
    fn span(&self) -> &Span;
}
