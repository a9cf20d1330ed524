//! Table of contents renderer.

use std::fmt::Write;

use crate::buffer::Buffer;
use crate::construct::TableCell;
use crate::renderer::{BlockResult, Renderer, Span, SpanResult};
use crate::state::RenderContext;

use super::{HtmlFlags, HtmlRenderer};

/// Renders a nested `<ul>` table of contents and nothing else.
///
/// Entries link to `#toc_N`, the anchors [`HtmlRenderer`] writes when
/// [`HtmlFlags::toc`] is set. Header levels are relative to the first
/// header, and headers deeper than the render's TOC nesting level are left
/// out. Inline formatting inside header text is rendered as HTML; links keep
/// only their content, and images, autolinks, raw HTML and footnote
/// references keep their source text.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlTocRenderer {
    html: HtmlRenderer,
}

impl HtmlTocRenderer {
    /// Create a TOC renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a TOC renderer whose header text uses `flags` (e.g. smartypants).
    #[must_use]
    pub fn with_flags(flags: HtmlFlags) -> Self {
        Self {
            html: HtmlRenderer::new(flags),
        }
    }
}

impl Renderer for HtmlTocRenderer {
    fn header(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str, _level: u8) -> BlockResult {
        let state = cx.state();
        let level = state.header_level();
        if level > state.nesting_level() {
            return Ok(());
        }

        let previous = state.previous_level();
        if level > previous {
            for _ in previous..level {
                out.push_str("<ul>\n<li>\n");
            }
        } else if level < previous {
            out.push_str("</li>\n");
            for _ in level..previous {
                out.push_str("</ul>\n</li>\n");
            }
            out.push_str("<li>\n");
        } else {
            out.push_str("</li>\n<li>\n");
        }

        writeln!(
            out,
            r##"<a href="#toc_{}">{}</a>"##,
            cx.header_count().saturating_sub(1),
            self.html.inline(text)
        )?;
        Ok(())
    }

    fn doc_footer(&self, cx: &RenderContext<'_>, out: &mut Buffer) -> BlockResult {
        for _ in 0..cx.state().current_level() {
            out.push_str("</li>\n</ul>\n");
        }
        Ok(())
    }

    // Everything but headers is left out.

    fn block_code(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str, _: Option<&str>) -> BlockResult {
        Ok(())
    }

    fn block_quote(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn block_html(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn list(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str, _: bool) -> BlockResult {
        Ok(())
    }

    fn list_item(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str, _: bool) -> BlockResult {
        Ok(())
    }

    fn paragraph(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn table(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn table_header(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn table_body(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn table_row(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn table_cell(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str, _: TableCell) -> BlockResult {
        Ok(())
    }

    fn footnotes(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str) -> BlockResult {
        Ok(())
    }

    fn footnote_def(&self, _: &RenderContext<'_>, _: &mut Buffer, _: &str, _: u32) -> BlockResult {
        Ok(())
    }

    fn autolink(&self, _cx: &RenderContext<'_>, _link: &str, _is_email: bool) -> SpanResult {
        Ok(Span::Suppress)
    }

    fn codespan(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.codespan(cx, text)
    }

    fn double_emphasis(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.double_emphasis(cx, text)
    }

    fn emphasis(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.emphasis(cx, text)
    }

    fn underline(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.underline(cx, text)
    }

    fn highlight(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.highlight(cx, text)
    }

    fn quote(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.quote(cx, text)
    }

    fn image(&self, _cx: &RenderContext<'_>, _link: &str, _title: Option<&str>, _alt: &str) -> SpanResult {
        Ok(Span::Suppress)
    }

    fn linebreak(&self, _cx: &RenderContext<'_>) -> SpanResult {
        Ok(Span::Suppress)
    }

    fn link(&self, _cx: &RenderContext<'_>, content: &str, _link: &str, _title: Option<&str>) -> SpanResult {
        Ok(Span::emit(content))
    }

    fn raw_html(&self, _cx: &RenderContext<'_>, _text: &str) -> SpanResult {
        Ok(Span::Suppress)
    }

    fn triple_emphasis(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.triple_emphasis(cx, text)
    }

    fn strikethrough(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.strikethrough(cx, text)
    }

    fn superscript(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.superscript(cx, text)
    }

    fn math(&self, cx: &RenderContext<'_>, text: &str, display: bool) -> SpanResult {
        self.html.math(cx, text, display)
    }

    fn normal_text(&self, cx: &RenderContext<'_>, text: &str) -> SpanResult {
        self.html.normal_text(cx, text)
    }
}
