//! Inline extensions recognized inside merged text runs.
//!
//! pulldown-cmark has no notion of `==highlight==`, `"quote"` spans or bare
//! URLs, so they are picked out of plain text after adjacent text events have
//! been merged into one run.

use std::ops::Range;

use crate::construct::AutolinkKind;
use crate::options::Extensions;

/// URL prefixes recognized as bare autolinks.
const URL_PREFIXES: &[&str] = &["http://", "https://", "ftp://", "www."];

/// What a piece of a text run turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum SegmentKind {
    Text,
    Highlight,
    Quote,
    Autolink { link: String, kind: AutolinkKind },
}

/// A piece of a text run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Segment {
    /// Whole segment, delimiters included.
    pub range: Range<usize>,
    /// Content between the delimiters; equal to `range` for text and links.
    pub inner: Range<usize>,
    pub kind: SegmentKind,
}

impl Segment {
    fn text(range: Range<usize>) -> Self {
        Self {
            inner: range.clone(),
            range,
            kind: SegmentKind::Text,
        }
    }
}

/// Split a text run into plain text and inline extension spans.
///
/// `autolinks` is false inside links, where bare URLs stay text.
pub(super) fn split(text: &str, extensions: &Extensions, autolinks: bool) -> Vec<Segment> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let found = if extensions.highlight && bytes[i..].starts_with(b"==") {
            delimited(text, i, "==", SegmentKind::Highlight)
        } else if extensions.quote && bytes[i] == b'"' {
            delimited(text, i, "\"", SegmentKind::Quote)
        } else if extensions.autolink
            && autolinks
            && text.is_char_boundary(i)
            && at_word_start(text, i)
        {
            bare_url(text, i)
        } else {
            None
        };

        match found {
            Some(segment) => {
                if plain_start < i {
                    segments.push(Segment::text(plain_start..i));
                }
                i = segment.range.end;
                plain_start = i;
                segments.push(segment);
            }
            None => i += 1,
        }
    }

    if plain_start < bytes.len() || segments.is_empty() {
        segments.push(Segment::text(plain_start..bytes.len()));
    }
    segments
}

/// Span opened by `delim` at `start` and closed by the next `delim`.
fn delimited(text: &str, start: usize, delim: &str, kind: SegmentKind) -> Option<Segment> {
    let inner_start = start + delim.len();
    let inner_len = text[inner_start..].find(delim)?;
    let inner = &text[inner_start..inner_start + inner_len];
    let trimmed = inner.trim();
    if trimmed.is_empty() || trimmed.len() != inner.len() {
        return None;
    }
    let inner_end = inner_start + inner_len;
    Some(Segment {
        range: start..inner_end + delim.len(),
        inner: inner_start..inner_end,
        kind,
    })
}

fn at_word_start(text: &str, i: usize) -> bool {
    text[..i]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric() && c != '/' && c != ':')
}

/// Bare URL starting at `start`.
fn bare_url(text: &str, start: usize) -> Option<Segment> {
    let rest = &text[start..];
    let prefix = URL_PREFIXES.iter().find(|p| rest.starts_with(**p))?;

    let mut end = rest
        .find(|c: char| c.is_whitespace() || c == '<' || c == '>')
        .unwrap_or(rest.len());
    end = trim_url_end(&rest[..end]);

    let url = &rest[..end];
    let host = &url[prefix.len()..];
    if host.is_empty() || !host.starts_with(|c: char| c.is_alphanumeric()) {
        return None;
    }
    if *prefix == "www." && !host.contains('.') {
        return None;
    }

    let link = if *prefix == "www." {
        format!("http://{url}")
    } else {
        url.to_owned()
    };
    Some(Segment {
        range: start..start + end,
        inner: start..start + end,
        kind: SegmentKind::Autolink {
            link,
            kind: AutolinkKind::Url,
        },
    })
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_url_end(url: &str) -> usize {
    let mut end = url.len();
    loop {
        let Some(last) = url[..end].chars().next_back() else {
            return end;
        };
        let trim = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' | '*' | '_' | '~' => true,
            ')' => {
                let head = &url[..end];
                head.matches('(').count() < head.matches(')').count()
            }
            _ => false,
        };
        if !trim {
            return end;
        }
        end -= last.len_utf8();
    }
}
