//! HTML renderers.
//!
//! [`HtmlRenderer`] renders every construct as HTML; [`HtmlTocRenderer`]
//! renders only a table of contents built from headers.

mod smartypants;
mod toc;

use std::borrow::Cow;
use std::fmt::Write;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::buffer::Buffer;
use crate::construct::{Alignment, TableCell};
use crate::renderer::{BlockResult, Renderer, Span, SpanResult};
use crate::state::RenderContext;
use crate::util::{escape_html, push_escaped};

pub use smartypants::smartypants;
pub use toc::HtmlTocRenderer;

/// Characters left as-is in `href` and `src` attributes.
const HREF_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'+')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b',')
    .remove(b'%')
    .remove(b'#')
    .remove(b'@')
    .remove(b'?')
    .remove(b'=')
    .remove(b';')
    .remove(b':')
    .remove(b'/')
    .remove(b'&')
    .remove(b'$')
    .remove(b'~');

/// Percent-encode a URL for use in an attribute.
///
/// Existing `%XX` sequences are kept; `&` and `'` are HTML-escaped.
#[must_use]
pub fn escape_href(url: &str) -> String {
    let encoded = utf8_percent_encode(url, HREF_ESCAPE).to_string();
    encoded.replace('&', "&amp;").replace('\'', "&#x27;")
}

/// HTML output flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct HtmlFlags {
    /// Drop raw HTML blocks and inline tags.
    pub skip_html: bool,
    /// Escape raw HTML instead of passing it through. Takes precedence over
    /// `skip_html`.
    pub escape: bool,
    /// Line breaks inside paragraphs become `<br>`.
    pub hard_wrap: bool,
    /// Self-closing void elements (`<br/>`, `<hr/>`, `<img/>`).
    pub use_xhtml: bool,
    /// Give headers `id="toc_N"` anchors matching [`HtmlTocRenderer`].
    pub toc: bool,
    /// Typographic punctuation in text.
    pub smartypants: bool,
}

/// Renders every construct as HTML.
///
/// Stateless; one renderer can serve any number of renders.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer {
    flags: HtmlFlags,
}

impl HtmlRenderer {
    /// Create a renderer with the given flags.
    #[must_use]
    pub fn new(flags: HtmlFlags) -> Self {
        Self { flags }
    }

    /// Output flags.
    #[must_use]
    pub fn flags(&self) -> HtmlFlags {
        self.flags
    }

    fn void_close(&self) -> &'static str {
        if self.flags.use_xhtml { "/>" } else { ">" }
    }

    fn br(&self) -> &'static str {
        if self.flags.use_xhtml { "<br/>" } else { "<br>" }
    }

    /// Inline content of a block, with SmartyPants applied when enabled.
    ///
    /// Runs over the whole block so quotes pair across inline tags.
    pub(crate) fn inline<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.flags.smartypants {
            smartypants(text).into()
        } else {
            text.into()
        }
    }

    /// Raw HTML after applying `escape` and `skip_html`; `None` drops it.
    fn raw<'t>(&self, text: &'t str) -> Option<Cow<'t, str>> {
        if self.flags.escape {
            Some(escape_html(text).into())
        } else if self.flags.skip_html {
            None
        } else {
            Some(text.into())
        }
    }
}

/// Separate a block from the previous one.
fn block_separator(out: &mut Buffer) {
    if !out.is_empty() {
        out.push('\n');
    }
}

fn push_attributes(out: &mut String, cx: &RenderContext<'_>) {
    if let Some(attributes) = cx.link_attributes() {
        out.push(' ');
        out.push_str(attributes);
    }
}

fn wrap(open: &str, text: &str, close: &str) -> SpanResult {
    Ok(Span::emit(format!("{open}{text}{close}")))
}

impl Renderer for HtmlRenderer {
    fn block_code(
        &self,
        _cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        lang: Option<&str>,
    ) -> BlockResult {
        block_separator(out);
        match lang {
            Some(lang) => write!(out, r#"<pre><code class="language-{}">"#, escape_html(lang))?,
            None => out.push_str("<pre><code>"),
        }
        out.push_str(&escape_html(text));
        out.push_str("</code></pre>\n");
        Ok(())
    }

    fn block_quote(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        block_separator(out);
        out.push_str("<blockquote>\n");
        out.push_str(text);
        out.push_str("</blockquote>\n");
        Ok(())
    }

    fn block_html(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        let text = text.trim_matches('\n');
        if text.is_empty() {
            return Ok(());
        }
        if let Some(html) = self.raw(text) {
            block_separator(out);
            out.push_str(&html);
            out.push('\n');
        }
        Ok(())
    }

    fn header(&self, cx: &RenderContext<'_>, out: &mut Buffer, text: &str, level: u8) -> BlockResult {
        block_separator(out);
        if self.flags.toc {
            write!(
                out,
                r#"<h{level} id="toc_{}">"#,
                cx.header_count().saturating_sub(1)
            )?;
        } else {
            write!(out, "<h{level}>")?;
        }
        out.push_str(&self.inline(text));
        writeln!(out, "</h{level}>")?;
        Ok(())
    }

    fn hrule(&self, _cx: &RenderContext<'_>, out: &mut Buffer) -> BlockResult {
        block_separator(out);
        out.push_str("<hr");
        out.push_str(self.void_close());
        out.push('\n');
        Ok(())
    }

    fn list(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str, is_ordered: bool) -> BlockResult {
        let tag = if is_ordered { "ol" } else { "ul" };
        block_separator(out);
        writeln!(out, "<{tag}>")?;
        out.push_str(text);
        writeln!(out, "</{tag}>")?;
        Ok(())
    }

    fn list_item(
        &self,
        _cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        _is_ordered: bool,
    ) -> BlockResult {
        out.push_str("<li>");
        out.push_str(&self.inline(text.trim_end_matches('\n')));
        out.push_str("</li>\n");
        Ok(())
    }

    fn paragraph(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        let text = text.trim_start();
        if text.is_empty() {
            return Ok(());
        }
        let text = self.inline(text);
        block_separator(out);
        out.push_str("<p>");
        if self.flags.hard_wrap {
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    if !out.ends_with("<br>") && !out.ends_with("<br/>") {
                        out.push_str(self.br());
                    }
                    out.push('\n');
                }
                out.push_str(line);
            }
        } else {
            out.push_str(&text);
        }
        out.push_str("</p>\n");
        Ok(())
    }

    fn table(&self, _cx: &RenderContext<'_>, out: &mut Buffer, content: &str) -> BlockResult {
        block_separator(out);
        out.push_str("<table>\n");
        out.push_str(content);
        out.push_str("</table>\n");
        Ok(())
    }

    fn table_header(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str("<thead>\n");
        out.push_str(text);
        out.push_str("</thead>\n");
        Ok(())
    }

    fn table_body(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str("<tbody>\n");
        out.push_str(text);
        out.push_str("</tbody>\n");
        Ok(())
    }

    fn table_row(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        out.push_str("<tr>\n");
        out.push_str(text);
        out.push_str("</tr>\n");
        Ok(())
    }

    fn table_cell(
        &self,
        _cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        cell: TableCell,
    ) -> BlockResult {
        let tag = if cell.header { "th" } else { "td" };
        let style = match cell.align {
            Alignment::Left => r#" style="text-align: left""#,
            Alignment::Right => r#" style="text-align: right""#,
            Alignment::Center => r#" style="text-align: center""#,
            Alignment::None => "",
        };
        writeln!(out, "<{tag}{style}>{}</{tag}>", self.inline(text))?;
        Ok(())
    }

    fn footnotes(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
        block_separator(out);
        out.push_str("<div class=\"footnotes\">\n<hr");
        out.push_str(self.void_close());
        out.push_str("\n<ol>\n");
        out.push_str(text);
        out.push_str("\n</ol>\n</div>\n");
        Ok(())
    }

    fn footnote_def(
        &self,
        _cx: &RenderContext<'_>,
        out: &mut Buffer,
        text: &str,
        num: u32,
    ) -> BlockResult {
        write!(out, "\n<li id=\"fn{num}\">\n")?;
        let backref = format!("&#160;<a href=\"#fnref{num}\" rev=\"footnote\">&#8617;</a>");
        // The back reference goes at the end of the first paragraph
        match text.find("</p>") {
            Some(pos) => {
                out.push_str(&text[..pos]);
                out.push_str(&backref);
                out.push_str(&text[pos..]);
            }
            None => out.push_str(text),
        }
        out.push_str("</li>\n");
        Ok(())
    }

    fn autolink(&self, cx: &RenderContext<'_>, link: &str, is_email: bool) -> SpanResult {
        let mut html = String::from("<a href=\"");
        if is_email && !link.starts_with("mailto:") {
            html.push_str("mailto:");
        }
        html.push_str(&escape_href(link));
        html.push('"');
        push_attributes(&mut html, cx);
        html.push('>');
        push_escaped(&mut html, link.strip_prefix("mailto:").unwrap_or(link));
        html.push_str("</a>");
        Ok(Span::emit(html))
    }

    fn codespan(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<code>", &escape_html(text), "</code>")
    }

    fn double_emphasis(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<strong>", text, "</strong>")
    }

    fn emphasis(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<em>", text, "</em>")
    }

    fn underline(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<u>", text, "</u>")
    }

    fn highlight(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<mark>", text, "</mark>")
    }

    fn quote(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<q>", text, "</q>")
    }

    fn image(&self, cx: &RenderContext<'_>, link: &str, title: Option<&str>, alt: &str) -> SpanResult {
        let mut html = format!(r#"<img src="{}" alt=""#, escape_href(link));
        push_escaped(&mut html, alt);
        html.push('"');
        if let Some(title) = title {
            html.push_str(r#" title=""#);
            push_escaped(&mut html, title);
            html.push('"');
        }
        push_attributes(&mut html, cx);
        html.push_str(self.void_close());
        Ok(Span::emit(html))
    }

    fn linebreak(&self, _cx: &RenderContext<'_>) -> SpanResult {
        Ok(Span::emit(format!("{}\n", self.br())))
    }

    fn link(&self, cx: &RenderContext<'_>, content: &str, link: &str, title: Option<&str>) -> SpanResult {
        let mut html = format!(r#"<a href="{}""#, escape_href(link));
        if let Some(title) = title {
            html.push_str(r#" title=""#);
            push_escaped(&mut html, title);
            html.push('"');
        }
        push_attributes(&mut html, cx);
        html.push('>');
        html.push_str(content);
        html.push_str("</a>");
        Ok(Span::emit(html))
    }

    fn raw_html(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(match self.raw(text) {
            Some(html) => Span::emit(html.into_owned()),
            None => Span::empty(),
        })
    }

    fn triple_emphasis(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<strong><em>", text, "</em></strong>")
    }

    fn strikethrough(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<del>", text, "</del>")
    }

    fn superscript(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        wrap("<sup>", text, "</sup>")
    }

    fn footnote_ref(&self, _cx: &RenderContext<'_>, num: u32) -> SpanResult {
        Ok(Span::emit(format!(
            r##"<sup id="fnref{num}"><a href="#fn{num}" rel="footnote">{num}</a></sup>"##
        )))
    }

    fn math(&self, _cx: &RenderContext<'_>, text: &str, display: bool) -> SpanResult {
        let (open, close) = if display { ("\\[", "\\]") } else { ("\\(", "\\)") };
        wrap(open, &escape_html(text), close)
    }

    fn entity(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(text))
    }

    fn normal_text(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
        Ok(Span::emit(escape_html(text)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::markdown::Markdown;
    use crate::options::{Extensions, RenderOptions};
    use crate::state::RenderState;

    fn render_with(flags: HtmlFlags, extensions: Extensions, text: &str) -> String {
        let renderer = HtmlRenderer::new(flags);
        Markdown::new(&renderer)
            .with_extensions(extensions)
            .render(text)
            .unwrap()
            .output
    }

    fn render(text: &str) -> String {
        render_with(HtmlFlags::default(), Extensions::none(), text)
    }

    #[test]
    fn test_escape_href() {
        assert_eq!(
            escape_href("/search?query=Markdown+Test&page=2"),
            "/search?query=Markdown+Test&amp;page=2"
        );
        assert_eq!(escape_href("a b\"c"), "a%20b%22c");
        assert_eq!(escape_href("/caf\u{e9}"), "/caf%C3%A9");
        assert_eq!(escape_href("it's%20ok"), "it&#x27;s%20ok");
    }

    #[test]
    fn test_one_liner() {
        assert_eq!(render("Hello World."), "<p>Hello World.</p>\n");
    }

    #[test]
    fn test_inline_markdown() {
        assert_eq!(render("_Hello World_!"), "<p><em>Hello World</em>!</p>\n");
        assert_eq!(
            render("Run 'rake radiant:extensions:rbac_base:migrate'"),
            "<p>Run &#39;rake radiant:extensions:rbac_base:migrate&#39;</p>\n"
        );
    }

    #[test]
    fn test_urls_not_doubly_escaped() {
        assert_eq!(
            render("[Page 2](/search?query=Markdown+Test&page=2)"),
            "<p><a href=\"/search?query=Markdown+Test&amp;page=2\">Page 2</a></p>\n"
        );
    }

    #[test]
    fn test_html_block_between_paragraphs() {
        assert_eq!(
            render("before\n\n<div>\n  foo\n</div>\n\nafter"),
            "<p>before</p>\n\n<div>\n  foo\n</div>\n\n<p>after</p>\n"
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(
            render("A wise man once said:\n\n > Isn't it wonderful just to be alive.\n"),
            "<p>A wise man once said:</p>\n\n\
             <blockquote>\n<p>Isn&#39;t it wonderful just to be alive.</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            render("    This is a code block\n    This is a link [[1]] inside\n"),
            "<pre><code>This is a code block\nThis is a link [[1]] inside\n</code></pre>\n"
        );
        assert_eq!(
            render("```rust\nlet x = 1 < 2;\n```"),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_linkable_headers() {
        assert_eq!(
            render("### Hello [GitHub](http://github.com)"),
            "<h3>Hello <a href=\"http://github.com\">GitHub</a></h3>\n"
        );
    }

    #[test]
    fn test_toc_anchors() {
        let flags = HtmlFlags {
            toc: true,
            ..HtmlFlags::default()
        };
        assert_eq!(
            render_with(flags, Extensions::none(), "# A\n\n## B"),
            "<h1 id=\"toc_0\">A</h1>\n\n<h2 id=\"toc_1\">B</h2>\n"
        );
    }

    #[test]
    fn test_toc_anchor_outside_a_render() {
        let renderer = HtmlRenderer::new(HtmlFlags {
            toc: true,
            ..HtmlFlags::default()
        });
        let state = RenderState::default();
        let extensions = Extensions::default();
        let cx = RenderContext::new(&state, &extensions, None);
        let mut out = Buffer::new();
        renderer.header(&cx, &mut out, "A", 2).unwrap();
        assert_eq!(out.to_str().unwrap(), "<h2 id=\"toc_0\">A</h2>\n");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            render("* one\n* two"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
        assert_eq!(render("1. one\n\n2. two"), "<ol>\n<li><p>one</p></li>\n<li><p>two</p></li>\n</ol>\n");
    }

    #[test]
    fn test_hrule() {
        assert_eq!(render("* * *"), "<hr>\n");
        let flags = HtmlFlags {
            use_xhtml: true,
            ..HtmlFlags::default()
        };
        assert_eq!(render_with(flags, Extensions::none(), "---"), "<hr/>\n");
    }

    #[test]
    fn test_autolinks() {
        let gfm = Extensions::gfm();
        assert_eq!(
            render_with(HtmlFlags::default(), gfm, "http://axr.vg/"),
            "<p><a href=\"http://axr.vg/\">http://axr.vg/</a></p>\n"
        );
        assert_eq!(
            render_with(
                HtmlFlags::default(),
                gfm,
                "This a stupid link: https://github.com/rtomayko/tilt/issues?milestone=1&state=open"
            ),
            "<p>This a stupid link: <a href=\"https://github.com/rtomayko/tilt/issues?milestone=1&amp;state=open\">\
             https://github.com/rtomayko/tilt/issues?milestone=1&amp;state=open</a></p>\n"
        );
        assert_eq!(
            render("<me@example.com>"),
            "<p><a href=\"mailto:me@example.com\">me@example.com</a></p>\n"
        );
    }

    #[test]
    fn test_whitespace_after_urls() {
        assert_eq!(
            render_with(
                HtmlFlags::default(),
                Extensions::gfm(),
                "Japan: http://www.abc.net.au/news/events/japan-quake-2011/beforeafter.htm (yes, japan)"
            ),
            "<p>Japan: <a href=\"http://www.abc.net.au/news/events/japan-quake-2011/beforeafter.htm\">\
             http://www.abc.net.au/news/events/japan-quake-2011/beforeafter.htm</a> (yes, japan)</p>\n"
        );
    }

    #[test]
    fn test_tables() {
        let text = " aaa | bbbb\n-----|------\nhello|sailor\n";
        assert!(!render(text).contains("<table"));
        assert_eq!(
            render_with(HtmlFlags::default(), Extensions::gfm(), text),
            "<table>\n<thead>\n<tr>\n<th>aaa</th>\n<th>bbbb</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td>hello</td>\n<td>sailor</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_table_alignment() {
        let output = render_with(HtmlFlags::default(), Extensions::gfm(), "| a | b |\n|:-:|--:|\n");
        assert!(output.contains("<th style=\"text-align: center\">a</th>"));
        assert!(output.contains("<th style=\"text-align: right\">b</th>"));
        assert!(output.contains("<tbody>\n</tbody>\n"));
    }

    #[test]
    fn test_strikethrough() {
        let text = "this is ~~striked~~ text";
        assert!(!render(text).contains("<del"));
        assert!(render_with(HtmlFlags::default(), Extensions::gfm(), text).contains("<del>striked</del>"));
    }

    #[test]
    fn test_extension_spans() {
        let output = render_with(
            HtmlFlags::default(),
            Extensions::all(),
            "***a*** _b_ ==c== \"d\" ^e^ $f$",
        );
        assert_eq!(
            output,
            "<p><strong><em>a</em></strong> <u>b</u> <mark>c</mark> <q>d</q> <sup>e</sup> \\(f\\)</p>\n"
        );
    }

    #[test]
    fn test_footnotes() {
        let output = render_with(
            HtmlFlags::default(),
            Extensions::all(),
            "line1 [^1]\n\n[^1]: test1\n",
        );
        assert_eq!(
            output,
            "<p>line1 <sup id=\"fnref1\"><a href=\"#fn1\" rel=\"footnote\">1</a></sup></p>\n\n\
             <div class=\"footnotes\">\n<hr>\n<ol>\n\n\
             <li id=\"fn1\">\n<p>test1&#160;<a href=\"#fnref1\" rev=\"footnote\">&#8617;</a></p>\n</li>\n\
             \n</ol>\n</div>\n"
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            render("![a \"cat\"](/cat.png \"Cat\")"),
            "<p><img src=\"/cat.png\" alt=\"a &quot;cat&quot;\" title=\"Cat\"></p>\n"
        );
    }

    #[test]
    fn test_link_attributes() {
        let renderer = HtmlRenderer::default();
        let options = RenderOptions::default()
            .with_link_attributes(|url| url.starts_with("http").then(|| r#"rel="nofollow""#.to_owned()));
        let output = Markdown::new(&renderer)
            .with_options(options)
            .render("[a](https://x.org) [b](/local)")
            .unwrap()
            .output;
        assert_eq!(
            output,
            "<p><a href=\"https://x.org\" rel=\"nofollow\">a</a> <a href=\"/local\">b</a></p>\n"
        );
    }

    #[test]
    fn test_skip_html() {
        let flags = HtmlFlags {
            skip_html: true,
            ..HtmlFlags::default()
        };
        assert_eq!(
            render_with(flags, Extensions::none(), "Through <em>NO</em> <script>DOUBLE NO</script>"),
            "<p>Through NO DOUBLE NO</p>\n"
        );
        assert_eq!(
            render_with(flags, Extensions::none(), "Lorem,  \nipsum\n"),
            "<p>Lorem,<br>\nipsum</p>\n"
        );
    }

    #[test]
    fn test_escape_html() {
        let flags = HtmlFlags {
            escape: true,
            skip_html: true,
            ..HtmlFlags::default()
        };
        assert_eq!(
            render_with(flags, Extensions::none(), "Through <em>NO</em>"),
            "<p>Through &lt;em&gt;NO&lt;/em&gt;</p>\n"
        );
        assert_eq!(
            render_with(flags, Extensions::none(), "<div>\nBAD\n</div>"),
            "&lt;div&gt;\nBAD\n&lt;/div&gt;\n"
        );
    }

    #[test]
    fn test_hard_wrap() {
        let flags = HtmlFlags {
            hard_wrap: true,
            ..HtmlFlags::default()
        };
        assert_eq!(
            render_with(flags, Extensions::none(), "Hello world,\nthis is a test  \nend"),
            "<p>Hello world,<br>\nthis is a test<br>\nend</p>\n"
        );
    }

    #[test]
    fn test_smartypants_flag() {
        let flags = HtmlFlags {
            smartypants: true,
            ..HtmlFlags::default()
        };
        assert_eq!(
            render_with(flags, Extensions::none(), "They're here -- \"now\"."),
            "<p>They&rsquo;re here &ndash; &ldquo;now&rdquo;.</p>\n"
        );
    }

    #[test]
    fn test_smartypants_pairs_quotes_across_tags() {
        let flags = HtmlFlags {
            smartypants: true,
            ..HtmlFlags::default()
        };
        assert_eq!(
            render_with(flags, Extensions::none(), "\"hello *world*\""),
            "<p>&ldquo;hello <em>world</em>&rdquo;</p>\n"
        );
        assert_eq!(
            render_with(flags, Extensions::none(), "She said \"*no*\" twice"),
            "<p>She said &ldquo;<em>no</em>&rdquo; twice</p>\n"
        );
        assert_eq!(
            render_with(flags, Extensions::none(), "# \"A *b*\"\n\n- \"c `d`\""),
            "<h1>&ldquo;A <em>b</em>&rdquo;</h1>\n\n<ul>\n<li>&ldquo;c <code>d</code>&rdquo;</li>\n</ul>\n"
        );
    }
}
