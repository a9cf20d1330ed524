//! Canonical Markdown renderer.
//!
//! [`CanonicalRenderer`] writes every construct back out as CommonMark
//! (plus the enabled extensions), so re-parsing its output reproduces the
//! document structure. Blocks are separated by one blank line; headers are
//! always ATX, code blocks are always fenced and lists use `-` and `1.`
//! markers.

use std::fmt::Write;

use crate::buffer::Buffer;
use crate::construct::{Alignment, TableCell};
use crate::renderer::{BlockResult, Renderer, Span, SpanResult};
use crate::state::RenderContext;

/// Renders constructs as Markdown source.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalRenderer;

fn block_separator(out: &mut Buffer) {
    if !out.is_empty() {
        out.push('\n');
    }
}

/// Append `text` line by line, the first line after `first` and the rest
/// after `rest`. Blank lines get the prefix without trailing spaces.
fn push_prefixed(out: &mut Buffer, text: &str, first: &str, rest: &str) {
    if text.is_empty() {
        out.push_str(first.trim_end());
        out.push('\n');
        return;
    }
    for (i, line) in text.lines().enumerate() {
        let prefix = if i == 0 { first } else { rest };
        if line.is_empty() {
            out.push_str(prefix.trim_end());
        } else {
            out.push_str(prefix);
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Longest run of `c` in `text`.
fn longest_run(text: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Whether a list item holds block content, i.e. the list was loose.
///
/// A tight item is plain text, optionally followed by one nested block; a
/// loose item starts with a paragraph, which ends in a newline of its own.
fn is_loose_item(text: &str) -> bool {
    text.contains("\n\n") || (text.ends_with('\n') && !text.trim_end().contains('\n'))
}

fn push_destination(out: &mut String, link: &str, title: Option<&str>) {
    out.push('(');
    if link.is_empty() || link.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        out.push('<');
        out.push_str(&link.replace('<', "%3C").replace('>', "%3E"));
        out.push('>');
    } else {
        out.push_str(link);
    }
    if let Some(title) = title {
        out.push_str(" \"");
        out.push_str(&title.replace('\\', "\\\\").replace('"', "\\\""));
        out.push('"');
    }
    out.push(')');
}

/// Backslash-escape characters that would otherwise start Markdown syntax.
fn escape_text(cx: &RenderContext<'_>, text: &str) -> String {
    let extensions = cx.extensions();
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        let escape = match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '!' | '#' | '&' | '|' => true,
            '-' | '+' => i == 0,
            '.' | ')' => digits > 0 && i == digits,
            '~' => extensions.strikethrough,
            '^' => extensions.superscript,
            '$' => extensions.math,
            '=' => extensions.highlight,
            '"' => extensions.quote,
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn wrap(delim: &str, text: &str) -> SpanResult {
    Ok(Span::emit(format!("{delim}{text}{delim}")))
}

impl Renderer for CanonicalRenderer {
    fn block_code(
        &self,
        _cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        lang: Option<&str>,
    ) -> BlockResult {
        let fence = "`".repeat(longest_run(text, '`').max(2) + 1);
        block_separator(out);
        writeln!(out, "{fence}{}", lang.unwrap_or_default())?;
        out.push_str(text);
        if !text.is_empty() && !text.ends_with('\n') {
            out.push('\n');
        }
        writeln!(out, "{fence}")?;
        Ok(())
    }

    fn block_quote(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        block_separator(out);
        push_prefixed(out, text, "> ", "> ");
        Ok(())
    }

    fn block_html(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        block_separator(out);
        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
        Ok(())
    }

    fn header(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str, level: u8) -> BlockResult {
        block_separator(out);
        writeln!(out, "{} {text}", "#".repeat(usize::from(level)))?;
        Ok(())
    }

    fn hrule(&self, _cx: &RenderContext<'_>, out: &mut Buffer) -> BlockResult {
        block_separator(out);
        out.push_str("***\n");
        Ok(())
    }

    fn list(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str, _is_ordered: bool) -> BlockResult {
        block_separator(out);
        out.push_str(text.trim_end_matches('\n'));
        out.push('\n');
        Ok(())
    }

    fn list_item(
        &self,
        _cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        is_ordered: bool,
    ) -> BlockResult {
        let (marker, indent) = if is_ordered { ("1. ", "   ") } else { ("- ", "  ") };
        push_prefixed(out, text.trim_end_matches('\n'), marker, indent);
        if is_loose_item(text) {
            out.push('\n');
        }
        Ok(())
    }

    fn paragraph(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        block_separator(out);
        out.push_str(text);
        out.push('\n');
        Ok(())
    }

    fn table(&self, _cx: &RenderContext<'_>, out: &mut Buffer, content: &str) -> BlockResult {
        block_separator(out);
        out.push_str(content);
        Ok(())
    }

    fn table_header(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Header cells arrive as `cell\ndelimiter|cell\ndelimiter|`; table
    /// cells never contain newlines, so the two rows split apart cleanly.
    fn table_row(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        let mut lines = text.split('\n');
        let mut cells = String::from(lines.next().unwrap_or_default());
        let mut delimiters = String::new();
        for line in lines {
            let (delimiter, cell) = line.split_at(line.find('|').map_or(line.len(), |i| i + 1));
            delimiters.push_str(delimiter);
            cells.push_str(cell);
        }
        writeln!(out, "|{cells}")?;
        if !delimiters.is_empty() {
            writeln!(out, "|{delimiters}")?;
        }
        Ok(())
    }

    fn table_cell(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str, cell: TableCell) -> BlockResult {
        write!(out, " {text} |")?;
        if cell.header {
            let delimiter = match cell.align {
                Alignment::None => "---",
                Alignment::Left => ":--",
                Alignment::Center => ":-:",
                Alignment::Right => "--:",
            };
            write!(out, "\n{delimiter}|")?;
        }
        Ok(())
    }

    fn footnotes(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        block_separator(out);
        out.push_str(text);
        Ok(())
    }

    fn footnote_def(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str, num: u32) -> BlockResult {
        block_separator(out);
        push_prefixed(out, text.trim_end_matches('\n'), &format!("[^{num}]: "), "    ");
        Ok(())
    }

    fn autolink(&self, _cx: &RenderContext<'_>, link: &str, _is_email: bool) -> SpanResult {
        Ok(Span::emit(format!("<{link}>")))
    }

    fn codespan(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        let fence = "`".repeat(longest_run(text, '`') + 1);
        let pad = text.starts_with('`')
            || text.ends_with('`')
            || (text.starts_with(' ') && text.ends_with(' ') && !text.trim().is_empty());
        let space = if pad { " " } else { "" };
        Ok(Span::emit(format!("{fence}{space}{text}{space}{fence}")))
    }

    fn double_emphasis(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("**", text)
    }

    fn emphasis(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("*", text)
    }

    fn underline(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("_", text)
    }

    fn highlight(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("==", text)
    }

    fn quote(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("\"", text)
    }

    fn image(&self, _cx: &RenderContext<'_>, link: &str, title: Option<&str>, alt: &str) -> SpanResult {
        let mut md = format!("![{alt}]");
        push_destination(&mut md, link, title);
        Ok(Span::emit(md))
    }

    fn linebreak(&self, _cx: &RenderContext<'_>) -> SpanResult {
        Ok(Span::emit("\\\n"))
    }

    fn link(&self, _cx: &RenderContext<'_>, content: &str, link: &str, title: Option<&str>) -> SpanResult {
        let mut md = format!("[{content}]");
        push_destination(&mut md, link, title);
        Ok(Span::emit(md))
    }

    fn triple_emphasis(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("***", text)
    }

    fn strikethrough(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("~~", text)
    }

    fn superscript(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("^", text)
    }

    fn footnote_ref(&self, _cx: &RenderContext<'_>, num: u32) -> SpanResult {
        Ok(Span::emit(format!("[^{num}]")))
    }

    fn math(&self, _cx: &RenderContext<'_>, text: &str, display: bool) -> SpanResult {
        wrap(if display { "$$" } else { "$" }, text)
    }

    fn normal_text(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(escape_text(cx, text)))
    }
}
