//! Lexical context scanning: label every byte of a source file as code,
//! comment, or string literal in one pass, without parsing.

use crate::types::Span;

/// Context classification for a run of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLabel {
    /// Inside a `/* ... */` comment, delimiters included.
    BlockComment,
    /// Plain source text, including all whitespace and newlines.
    Code,
    /// Inside a `//` comment, up to but not including the newline.
    LineComment,
    /// Inside a `"..."` or `'...'` literal, quotes included.
    StringLiteral,
}

/// The full context partition of one text: consecutive labeled spans that
/// cover `[0, len)` with no gaps and no overlaps.
#[derive(Debug)]
pub struct ContextMap {
    /// Labeled spans in ascending offset order.
    spans: Vec<ContextSpan>,
}

impl ContextMap {
    /// Iterate `(offset, byte)` pairs for Code-labeled bytes inside `window`.
    pub fn code_bytes_in<'a>(
        &'a self,
        text: &'a str,
        window: Span,
    ) -> impl Iterator<Item = (usize, u8)> + 'a {
        return self.code_spans().flat_map(move |span| {
            let start = span.start.max(window.start);
            let end = span.end.min(window.end);
            return text
                .get(start..end)
                .unwrap_or("")
                .bytes()
                .enumerate()
                .map(move |(i, byte)| return (start.saturating_add(i), byte));
        });
    }

    /// Iterate the Code-labeled spans of the partition, ascending.
    pub fn code_spans(&self) -> impl Iterator<Item = Span> + '_ {
        return self
            .spans()
            .iter()
            .filter(|cs| return cs.label == ContextLabel::Code)
            .map(|cs| return cs.span);
    }

    /// Whether the byte at `offset` is plain code. Offsets at or past the end
    /// of the text count as code so insertion points stay addressable.
    pub fn is_code(&self, offset: usize) -> bool {
        return self.label_at(offset) == ContextLabel::Code;
    }

    /// The label covering `offset`.
    pub fn label_at(&self, offset: usize) -> ContextLabel {
        let idx = self.spans.partition_point(|cs| return cs.span.start <= offset);
        let Some(covering) = idx.checked_sub(1).and_then(|i| return self.spans.get(i)) else {
            return ContextLabel::Code;
        };
        if covering.span.contains(offset) {
            return covering.label;
        }
        return ContextLabel::Code;
    }

    /// Copy `window` from `text` with every byte outside the wanted contexts
    /// replaced by a space, so match offsets line up with the original text.
    ///
    /// Comments are always blanked; string literals are kept only when
    /// `keep_strings` is set. Multi-byte characters blank to one space per
    /// byte to preserve offsets.
    pub fn masked(&self, text: &str, window: Span, keep_strings: bool) -> String {
        let Some(slice) = text.get(window.start..window.end) else {
            return String::new();
        };
        let mut out = String::with_capacity(slice.len());
        let first = self.spans.partition_point(|cs| return cs.span.end <= window.start);
        for cs in self.spans.iter().skip(first) {
            if cs.span.start >= window.end {
                break;
            }
            let start = cs.span.start.max(window.start);
            let end = cs.span.end.min(window.end);
            let Some(piece) = text.get(start..end) else {
                continue;
            };
            let keep = match cs.label {
                ContextLabel::BlockComment | ContextLabel::LineComment => false,
                ContextLabel::Code => true,
                ContextLabel::StringLiteral => keep_strings,
            };
            if keep {
                out.push_str(piece);
            } else {
                for _ in 0..piece.len() {
                    out.push(' ');
                }
            }
        }
        return out;
    }

    /// Scan `text` in a single left-to-right pass. Never fails: unterminated
    /// comments and strings are valid contexts that run to their boundary.
    ///
    /// Strings end at their quote or at the end of the line; `\` escapes the
    /// next character. Block comments do not nest. Newlines are code, so
    /// line-based passes over the partition stay cheap.
    pub fn scan(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut spans: Vec<ContextSpan> = Vec::new();
        let mut label = ContextLabel::Code;
        let mut run_start = 0_usize;
        let mut quote = 0_u8;
        let mut i = 0_usize;

        while i < bytes.len() {
            let byte = bytes.get(i).copied().unwrap_or(0);
            let next = bytes.get(i.saturating_add(1)).copied();
            match label {
                ContextLabel::BlockComment => {
                    if byte == b'*' && next == Some(b'/') {
                        i = i.saturating_add(2);
                        push_run(&mut spans, label, run_start, i);
                        label = ContextLabel::Code;
                        run_start = i;
                    } else {
                        i = i.saturating_add(1);
                    }
                },
                ContextLabel::Code => {
                    if byte == b'/' && next == Some(b'/') {
                        push_run(&mut spans, label, run_start, i);
                        label = ContextLabel::LineComment;
                        run_start = i;
                        i = i.saturating_add(2);
                    } else if byte == b'/' && next == Some(b'*') {
                        push_run(&mut spans, label, run_start, i);
                        label = ContextLabel::BlockComment;
                        run_start = i;
                        i = i.saturating_add(2);
                    } else if byte == b'"' || byte == b'\'' {
                        push_run(&mut spans, label, run_start, i);
                        label = ContextLabel::StringLiteral;
                        quote = byte;
                        run_start = i;
                        i = i.saturating_add(1);
                    } else {
                        i = i.saturating_add(1);
                    }
                },
                ContextLabel::LineComment => {
                    if byte == b'\n' {
                        push_run(&mut spans, label, run_start, i);
                        label = ContextLabel::Code;
                        run_start = i;
                    }
                    i = i.saturating_add(1);
                },
                ContextLabel::StringLiteral => {
                    if byte == b'\\' {
                        i = i.saturating_add(2);
                    } else if byte == quote {
                        i = i.saturating_add(1);
                        push_run(&mut spans, label, run_start, i);
                        label = ContextLabel::Code;
                        run_start = i;
                    } else if byte == b'\n' {
                        push_run(&mut spans, label, run_start, i);
                        label = ContextLabel::Code;
                        run_start = i;
                        i = i.saturating_add(1);
                    } else {
                        i = i.saturating_add(1);
                    }
                },
            }
        }
        push_run(&mut spans, label, run_start, bytes.len());
        return Self { spans };
    }

    /// The full partition, in ascending offset order.
    pub fn spans(&self) -> &[ContextSpan] {
        return &self.spans;
    }
}

/// A labeled region of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSpan {
    /// The classification of every byte in `span`.
    pub label: ContextLabel,
    /// The labeled byte range.
    pub span: Span,
}

/// Byte spans of each line's content, excluding the trailing `\n` and any
/// `\r` before it. Blank lines yield empty spans.
pub fn line_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0_usize;
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            let mut end = i;
            if end > start && text.as_bytes().get(end.saturating_sub(1)) == Some(&b'\r') {
                end = end.saturating_sub(1);
            }
            spans.push(Span::new(start, end));
            start = i.saturating_add(1);
        }
    }
    if start < text.len() {
        spans.push(Span::new(start, text.len()));
    }
    return spans;
}

/// Append a labeled run, coalescing with an adjacent run of the same label.
fn push_run(spans: &mut Vec<ContextSpan>, label: ContextLabel, start: usize, end: usize) {
    if start >= end {
        return;
    }
    if let Some(last) = spans.last_mut()
        && last.label == label
        && last.span.end == start
    {
        last.span.end = end;
        return;
    }
    spans.push(ContextSpan {
        label,
        span: Span::new(start, end),
    });
    return;
}
