//! Renderer trait: one method per construct kind.
//!
//! Every method has a default implementation, so a renderer only overrides
//! the constructs it cares about:
//! - block methods append their input text verbatim,
//! - span and low-level methods emit their input text unchanged.
//!
//! Child content always arrives already rendered.

use crate::buffer::{Buffer, Fragment};
use crate::construct::TableCell;
use crate::error::RendererError;
use crate::state::RenderContext;

/// Result of a span or low-level renderer method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Span {
    /// Substitute this fragment for the span. An empty fragment emits nothing.
    Emit(Fragment),
    /// Keep the span's literal source text.
    Suppress,
}

impl Span {
    /// Emit a fragment.
    pub fn emit(fragment: impl Into<Fragment>) -> Self {
        Self::Emit(fragment.into())
    }

    /// Handle the span but emit nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Emit(Fragment::Text(String::new()))
    }
}

/// Result of a block renderer method.
pub type BlockResult = Result<(), RendererError>;

/// Result of a span or low-level renderer method.
pub type SpanResult = Result<Span, RendererError>;

/// Renderer capability interface.
///
/// Block methods receive `out`, the buffer of the enclosing construct, and
/// append to it. Span methods return [`Span`]; returning an error from a
/// span method aborts the render, while a failing block method only skips
/// that block (unless the render is strict).
#[allow(unused_variables)]
pub trait Renderer {
    // Block level

    /// Fenced or indented code block. `lang` is the first word of the info string.
    fn block_code(
        &self,
        cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        lang: Option<&str>,
    ) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Block quote.
    fn block_quote(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Raw HTML block.
    fn block_html(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Header of absolute `level` (1-6).
    fn header(
        &self,
        cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        level: u8,
    ) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Thematic break.
    fn hrule(&self, cx: &RenderContext<'_>, out: &mut Buffer) -> BlockResult {
        Ok(())
    }

    /// List wrapping its rendered items.
    fn list(
        &self,
        cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        is_ordered: bool,
    ) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// List item; `is_ordered` is the enclosing list's ordering.
    fn list_item(
        &self,
        cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        is_ordered: bool,
    ) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Paragraph.
    fn paragraph(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Table wrapping the rendered header and body.
    fn table(&self, cx: &RenderContext<'_>, out: &mut Buffer, content: &str) -> BlockResult {
        out.push_str(content);
        Ok(())
    }

    /// Table header wrapping the rendered header row.
    fn table_header(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Table body wrapping the rendered body rows.
    fn table_body(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Table row wrapping its rendered cells.
    fn table_row(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Table cell.
    fn table_cell(
        &self,
        cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        cell: TableCell,
    ) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Footnote section wrapping every rendered definition.
    fn footnotes(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    /// Footnote definition number `num`.
    fn footnote_def(
        &self,
        cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        num: u32,
    ) -> BlockResult {
        out.push_str(text);
        Ok(())
    }

    // Span level

    /// Autolink; `is_email` for `<user@example.com>`.
    fn autolink(&self, cx: &RenderContext<'_>, link: &str, is_email: bool) -> SpanResult {
        Ok(Span::emit(link))
    }

    /// Inline code.
    fn codespan(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `**text**`
    fn double_emphasis(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `*text*`
    fn emphasis(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `_text_` with the underline extension.
    fn underline(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `==text==`
    fn highlight(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `"text"` with the quote extension.
    fn quote(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// Image; `title` is `None` when the source has none.
    fn image(
        &self,
        cx: &RenderContext<'_>,
        link: &str,
        title: Option<&str>,
        alt: &str,
    ) -> SpanResult {
        Ok(Span::emit(alt))
    }

    /// Hard line break.
    fn linebreak(&self, cx: &RenderContext<'_>) -> SpanResult {
        Ok(Span::emit("\n"))
    }

    /// Link; `title` is `None` when the source has none.
    fn link(
        &self,
        cx: &RenderContext<'_>,
        content: &str,
        link: &str,
        title: Option<&str>,
    ) -> SpanResult {
        Ok(Span::emit(content))
    }

    /// Inline HTML tag.
    fn raw_html(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `***text***`
    fn triple_emphasis(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `~~text~~`
    fn strikethrough(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// `^text^`
    fn superscript(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// Reference to footnote number `num`. Keeps the literal reference by default.
    fn footnote_ref(&self, cx: &RenderContext<'_>, num: u32) -> SpanResult {
        Ok(Span::Suppress)
    }

    /// Math; `display` for `$$...$$`.
    fn math(&self, cx: &RenderContext<'_>, text: &str, display: bool) -> SpanResult {
        Ok(Span::emit(text))
    }

    // Low level

    /// Character entity such as `&copy;`, as written in the source.
    fn entity(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    /// Plain text.
    fn normal_text(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    // Document

    /// Called once before anything else.
    fn doc_header(&self, cx: &RenderContext<'_>, out: &mut Buffer) -> BlockResult {
        Ok(())
    }

    /// Called once after everything else.
    fn doc_footer(&self, cx: &RenderContext<'_>, out: &mut Buffer) -> BlockResult {
        Ok(())
    }
}

/// Renderer using every default: block content passes through and spans
/// emit their text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughRenderer;

impl Renderer for PassthroughRenderer {}
