use crate::error::Error;
use std::{fmt, ops::Range};


/// A region of the problem statement, as 1-based inclusive character offsets. The problem
/// documents count characters rather than bytes, so `[1, 2]` is `最大` in `最大化...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        TextSpan { start, end }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The byte range of this span inside `text`, if it names a non-empty region of it.
    fn byte_range(&self, text: &str) -> Option<Range<usize>> {
        if self.start == 0 || self.end < self.start {
            return None;
        }
        let mut boundaries = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()));
        let start = boundaries.nth(self.start - 1)?;
        let end = boundaries.nth(self.end - self.start)?;
        Some(start..end)
    }

    /// Check that this span lies within `text`. `owner` names what the span belongs to.
    pub fn validate(&self, text: &str, owner: &str) -> Result<(), Error> {
        self.byte_range(text).map(|_| ()).ok_or_else(|| {
            Error::schema(format!(
                "text span {self} of {owner} lies outside the problem text of {} characters",
                text.chars().count()
            ))
        })
    }

    /// The text covered by this span.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.byte_range(text).map(|range| &text[range])
    }

    /// Keep this span pointing at the same text after `patched` was replaced by text that is
    /// `delta` characters longer. Spans before the patch are unaffected.
    pub fn shift(&mut self, patched: TextSpan, delta: isize) {
        if self.start > patched.end {
            self.start = self.start.saturating_add_signed(delta);
            self.end = self.end.saturating_add_signed(delta);
        }
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// The result of splicing a replacement into the problem statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    pub text: String,
    /// Where the replacement now lies.
    pub span: TextSpan,
    /// How many characters longer the text became.
    pub delta: isize,
}

/// Replace the region `span` of `text` with `replacement`.
pub fn patch(text: &str, span: TextSpan, replacement: &str) -> Result<Patch, Error> {
    let range = span.byte_range(text).ok_or_else(|| {
        Error::schema(format!(
            "cannot patch text span {span}: it lies outside the problem text"
        ))
    })?;
    let replacement_len = replacement.chars().count();
    let new_text = [&text[..range.start], replacement, &text[range.end..]].concat();
    Ok(Patch {
        text: new_text,
        span: TextSpan::new(span.start, span.start + replacement_len - 1),
        delta: replacement_len as isize - span.len() as isize,
    })
}
