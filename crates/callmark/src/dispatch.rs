//! Dispatch bridge between the scanner and a renderer.
//!
//! The [`Dispatcher`] receives construct events in document order, resolves
//! each to its renderer method, converts buffers to text, invokes the
//! method and appends the result to the caller's buffer.

use std::fmt;
use std::str::Utf8Error;

use crate::buffer::{Buffer, Fragment};
use crate::construct::{AutolinkKind, Category, Construct, ConstructEvent, ConstructKind};
use crate::error::{RenderError, RendererError};
use crate::options::RenderOptions;
use crate::renderer::{Renderer, Span};
use crate::state::{RenderContext, RenderState};

/// Lifecycle of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Created, nothing dispatched yet.
    Idle,
    /// Between `begin` and `end`.
    Rendering,
    /// `doc_footer` dispatched; the output is complete.
    Done,
    /// A fatal fault aborted the render.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Rendering => "rendering",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Result of rendering a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered document.
    pub output: String,
    /// Block constructs that failed and were skipped.
    pub warnings: Vec<String>,
    /// Number of headers in the document.
    pub header_count: usize,
}

/// A failed renderer call, before it is attached to a construct.
enum Fault {
    Renderer(RendererError),
    Marshal(Utf8Error),
}

impl From<RendererError> for Fault {
    fn from(error: RendererError) -> Self {
        Self::Renderer(error)
    }
}

impl From<Utf8Error> for Fault {
    fn from(error: Utf8Error) -> Self {
        Self::Marshal(error)
    }
}

/// Check that a construct produced text before it reaches its parent.
///
/// `written` is what a block method appended; span output is the fragment.
fn validate_output(span: Option<Span>, written: &[u8]) -> Result<Option<Span>, Fault> {
    if let Some(Span::Emit(Fragment::Bytes(bytes))) = &span {
        std::str::from_utf8(bytes)?;
    }
    std::str::from_utf8(written)?;
    Ok(span)
}

impl Fault {
    fn into_error(self, construct: ConstructKind, offset: usize) -> RenderError {
        match self {
            Self::Renderer(source) => RenderError::Renderer {
                construct,
                offset,
                source,
            },
            Self::Marshal(source) => RenderError::Marshal {
                construct,
                offset,
                source,
            },
        }
    }
}

/// Dispatch bridge for one document render.
///
/// Lifecycle: [`begin`](Self::begin) → [`dispatch`](Self::dispatch)* →
/// [`end`](Self::end) → [`finish`](Self::finish). Block failures are
/// skipped with a warning unless [`RenderOptions::strict`] is set; span and
/// low-level failures abort the render.
pub struct Dispatcher<'r, R: Renderer + ?Sized> {
    renderer: &'r R,
    options: &'r RenderOptions,
    state: RenderState,
    phase: Phase,
    warnings: Vec<String>,
    dispatched: usize,
    end_offset: usize,
}

impl<'r, R: Renderer + ?Sized> Dispatcher<'r, R> {
    /// Create an idle dispatcher.
    pub fn new(renderer: &'r R, options: &'r RenderOptions) -> Self {
        Self {
            renderer,
            options,
            state: RenderState::new(options.toc_nesting_level),
            phase: Phase::Idle,
            warnings: Vec::new(),
            dispatched: 0,
            end_offset: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current render state.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of constructs dispatched so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Start the render and dispatch `doc_header`.
    pub fn begin(&mut self, out: &mut Buffer) -> Result<(), RenderError> {
        if self.phase != Phase::Idle {
            return Err(RenderError::Phase {
                construct: ConstructKind::DocHeader,
                phase: self.phase,
            });
        }
        self.phase = Phase::Rendering;
        self.state = RenderState::new(self.options.toc_nesting_level);
        tracing::debug!(extensions = ?self.options.extensions, "Render started");
        self.dispatch(&ConstructEvent::new(Construct::DocHeader, 0, ""), out)
    }

    /// A list at `list_depth + 1` opened.
    pub fn open_list(&mut self) {
        self.state.open_list();
    }

    /// The innermost list closed.
    pub fn close_list(&mut self) {
        self.state.close_list();
    }

    /// Dispatch one construct, appending its output to `out`.
    pub fn dispatch(
        &mut self,
        event: &ConstructEvent<'_>,
        out: &mut Buffer,
    ) -> Result<(), RenderError> {
        let kind = event.construct.kind();
        if self.phase != Phase::Rendering {
            return Err(RenderError::Phase {
                construct: kind,
                phase: self.phase,
            });
        }
        self.dispatched += 1;

        if let Construct::Header { level, .. } = event.construct {
            self.state.enter_header(level);
        }

        let link_attributes = match event.construct {
            Construct::Link { link, .. }
            | Construct::Image { link, .. }
            | Construct::Autolink { link, .. } => self.options.link_attributes_for(link),
            _ => None,
        };

        let mark = out.len();
        let result = self
            .invoke(&event.construct, link_attributes.as_deref(), out)
            .and_then(|span| validate_output(span, &out.as_bytes()[mark..]));
        match result {
            Ok(Some(Span::Emit(fragment))) => out.push_fragment(&fragment),
            Ok(Some(Span::Suppress)) => {
                tracing::trace!(construct = %kind, offset = event.offset, "Span suppressed");
                out.push_str(event.literal);
            }
            Ok(None) => {}
            Err(fault) => {
                out.rollback(mark);
                let error = fault.into_error(kind, event.offset);
                if kind.category() == Category::Block && !self.options.strict {
                    tracing::warn!(
                        construct = %kind,
                        offset = event.offset,
                        error = %error,
                        "Skipping block construct"
                    );
                    self.warnings.push(error.to_string());
                } else {
                    self.phase = Phase::Failed;
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    /// Dispatch `doc_footer` and complete the render.
    ///
    /// `offset` is the length of the source document.
    pub fn end(&mut self, offset: usize, out: &mut Buffer) -> Result<(), RenderError> {
        self.end_offset = offset;
        self.dispatch(&ConstructEvent::new(Construct::DocFooter, offset, ""), out)?;
        self.phase = Phase::Done;
        Ok(())
    }

    /// Turn the completed document buffer into a [`RenderResult`].
    pub fn finish(self, out: Buffer) -> Result<RenderResult, RenderError> {
        if self.phase != Phase::Done {
            return Err(RenderError::Phase {
                construct: ConstructKind::DocFooter,
                phase: self.phase,
            });
        }
        let output = out.into_string().map_err(|e| RenderError::Marshal {
            construct: ConstructKind::DocFooter,
            offset: self.end_offset,
            source: e.utf8_error(),
        })?;
        tracing::debug!(
            constructs = self.dispatched,
            headers = self.state.header_count(),
            warnings = self.warnings.len(),
            "Render finished"
        );
        Ok(RenderResult {
            output,
            warnings: self.warnings,
            header_count: self.state.header_count(),
        })
    }

    /// Call the renderer method for `construct`.
    ///
    /// Block methods append to `out` and yield `None`; span and low-level
    /// methods yield their [`Span`].
    #[allow(clippy::too_many_lines)]
    fn invoke(
        &self,
        construct: &Construct<'_>,
        link_attributes: Option<&str>,
        out: &mut Buffer,
    ) -> Result<Option<Span>, Fault> {
        let r = self.renderer;
        let cx = RenderContext::new(&self.state, &self.options.extensions, link_attributes);

        let span = match *construct {
            Construct::BlockCode { text, lang } => {
                r.block_code(&cx, out, text.to_str()?, lang)?;
                return Ok(None);
            }
            Construct::BlockQuote { text } => {
                r.block_quote(&cx, out, text.to_str()?)?;
                return Ok(None);
            }
            Construct::BlockHtml { text } => {
                r.block_html(&cx, out, text.to_str()?)?;
                return Ok(None);
            }
            Construct::Header { text, level } => {
                r.header(&cx, out, text.to_str()?, level)?;
                return Ok(None);
            }
            Construct::HRule => {
                r.hrule(&cx, out)?;
                return Ok(None);
            }
            Construct::List { text, flags } => {
                r.list(&cx, out, text.to_str()?, flags.is_ordered())?;
                return Ok(None);
            }
            Construct::ListItem { text, flags } => {
                r.list_item(&cx, out, text.to_str()?, flags.is_ordered())?;
                return Ok(None);
            }
            Construct::Paragraph { text } => {
                r.paragraph(&cx, out, text.to_str()?)?;
                return Ok(None);
            }
            Construct::Table { content } => {
                r.table(&cx, out, content.to_str()?)?;
                return Ok(None);
            }
            Construct::TableHeader { text } => {
                r.table_header(&cx, out, text.to_str()?)?;
                return Ok(None);
            }
            Construct::TableBody { text } => {
                r.table_body(&cx, out, text.to_str()?)?;
                return Ok(None);
            }
            Construct::TableRow { text } => {
                r.table_row(&cx, out, text.to_str()?)?;
                return Ok(None);
            }
            Construct::TableCell { text, flags } => {
                r.table_cell(&cx, out, text.to_str()?, flags.normalize())?;
                return Ok(None);
            }
            Construct::Footnotes { text } => {
                r.footnotes(&cx, out, text.to_str()?)?;
                return Ok(None);
            }
            Construct::FootnoteDef { text, num } => {
                r.footnote_def(&cx, out, text.to_str()?, num)?;
                return Ok(None);
            }
            Construct::DocHeader => {
                r.doc_header(&cx, out)?;
                return Ok(None);
            }
            Construct::DocFooter => {
                r.doc_footer(&cx, out)?;
                return Ok(None);
            }
            Construct::Autolink { link, kind } => {
                r.autolink(&cx, link, kind == AutolinkKind::Email)?
            }
            Construct::Codespan { text } => r.codespan(&cx, text)?,
            Construct::DoubleEmphasis { text } => r.double_emphasis(&cx, text.to_str()?)?,
            Construct::Emphasis { text } => r.emphasis(&cx, text.to_str()?)?,
            Construct::Underline { text } => r.underline(&cx, text.to_str()?)?,
            Construct::Highlight { text } => r.highlight(&cx, text.to_str()?)?,
            Construct::Quote { text } => r.quote(&cx, text.to_str()?)?,
            Construct::Image { link, title, alt } => r.image(&cx, link, title, alt.to_str()?)?,
            Construct::LineBreak => r.linebreak(&cx)?,
            Construct::Link {
                content,
                link,
                title,
            } => r.link(&cx, content.to_str()?, link, title)?,
            Construct::RawHtml { text } => r.raw_html(&cx, text)?,
            Construct::TripleEmphasis { text } => r.triple_emphasis(&cx, text.to_str()?)?,
            Construct::Strikethrough { text } => r.strikethrough(&cx, text.to_str()?)?,
            Construct::Superscript { text } => r.superscript(&cx, text.to_str()?)?,
            Construct::FootnoteRef { num } => r.footnote_ref(&cx, num)?,
            Construct::Math { text, display } => r.math(&cx, text, display)?,
            Construct::Entity { text } => r.entity(&cx, text)?,
            Construct::NormalText { text } => r.normal_text(&cx, text)?,
        };
        Ok(Some(span))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::construct::{Alignment, CellFlags, ListFlags, TableCell};
    use crate::renderer::{BlockResult, PassthroughRenderer, SpanResult};

    /// Records what each renderer call observed.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl Renderer for Recorder {
        fn header(
            &self,
            cx: &RenderContext<'_>,
            out: &mut Buffer,
            text: &str,
            level: u8,
        ) -> BlockResult {
            self.calls.borrow_mut().push(format!(
                "header {text} level={level} count={}",
                cx.header_count()
            ));
            out.push_str(text);
            Ok(())
        }

        fn list_item(
            &self,
            cx: &RenderContext<'_>,
            _out: &mut Buffer,
            text: &str,
            is_ordered: bool,
        ) -> BlockResult {
            self.calls.borrow_mut().push(format!(
                "item {text} ordered={is_ordered} depth={}",
                cx.list_depth()
            ));
            Ok(())
        }

        fn table_cell(
            &self,
            _cx: &RenderContext<'_>,
            _out: &mut Buffer,
            text: &str,
            cell: TableCell,
        ) -> BlockResult {
            self.calls
                .borrow_mut()
                .push(format!("cell {text} {:?} header={}", cell.align, cell.header));
            Ok(())
        }

        fn link(
            &self,
            cx: &RenderContext<'_>,
            content: &str,
            link: &str,
            title: Option<&str>,
        ) -> SpanResult {
            self.calls.borrow_mut().push(format!(
                "link {content} {link} {title:?} {:?}",
                cx.link_attributes()
            ));
            Ok(Span::emit(content))
        }

        fn autolink(&self, _cx: &RenderContext<'_>, link: &str, is_email: bool) -> SpanResult {
            self.calls
                .borrow_mut()
                .push(format!("autolink {link} email={is_email}"));
            Ok(Span::Suppress)
        }
    }

    struct Failing;

    impl Renderer for Failing {
        fn paragraph(&self, _cx: &RenderContext<'_>, out: &mut Buffer, _text: &str) -> BlockResult {
            out.push_str("<p>partial");
            Err(RendererError::new("paragraph broke"))
        }

        fn emphasis(&self, _cx: &RenderContext<'_>, _text: &str) -> SpanResult {
            Err(RendererError::new("emphasis broke"))
        }
    }

    fn text_event(construct: Construct<'_>) -> ConstructEvent<'_> {
        ConstructEvent::new(construct, 7, "*literal*")
    }

    #[test]
    fn test_lifecycle() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&PassthroughRenderer, &options);
        let mut out = Buffer::new();
        assert_eq!(dispatcher.phase(), Phase::Idle);

        dispatcher.begin(&mut out).unwrap();
        assert_eq!(dispatcher.phase(), Phase::Rendering);

        dispatcher
            .dispatch(&text_event(Construct::NormalText { text: "hi" }), &mut out)
            .unwrap();
        dispatcher.end(2, &mut out).unwrap();
        assert_eq!(dispatcher.phase(), Phase::Done);
        assert_eq!(dispatcher.dispatched(), 3);

        let result = dispatcher.finish(out).unwrap();
        assert_eq!(result.output, "hi");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_dispatch_before_begin_is_refused() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&PassthroughRenderer, &options);
        let mut out = Buffer::new();
        let err = dispatcher
            .dispatch(&text_event(Construct::LineBreak), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Phase {
                construct: ConstructKind::LineBreak,
                phase: Phase::Idle
            }
        ));
    }

    #[test]
    fn test_finish_requires_done() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&PassthroughRenderer, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();
        assert!(dispatcher.finish(out).is_err());
    }

    #[test]
    fn test_header_state_updated_before_call() {
        let recorder = Recorder::default();
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&recorder, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();

        let first = Buffer::from("One");
        let second = Buffer::from("Two");
        dispatcher
            .dispatch(
                &text_event(Construct::Header {
                    text: &first,
                    level: 2,
                }),
                &mut out,
            )
            .unwrap();
        dispatcher
            .dispatch(
                &text_event(Construct::Header {
                    text: &second,
                    level: 3,
                }),
                &mut out,
            )
            .unwrap();

        assert_eq!(
            *recorder.calls.borrow(),
            vec![
                "header One level=2 count=1".to_owned(),
                "header Two level=3 count=2".to_owned(),
            ]
        );
        assert_eq!(dispatcher.state().current_level(), 2);
    }

    #[test]
    fn test_list_flags_collapse_to_ordering() {
        let recorder = Recorder::default();
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&recorder, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();
        dispatcher.open_list();

        let text = Buffer::from("a");
        let flags = ListFlags::from_bits(ListFlags::BLOCK);
        dispatcher
            .dispatch(&text_event(Construct::ListItem { text: &text, flags }), &mut out)
            .unwrap();

        assert_eq!(
            *recorder.calls.borrow(),
            vec!["item a ordered=false depth=1".to_owned()]
        );
    }

    #[test]
    fn test_cell_flags_are_normalized() {
        let recorder = Recorder::default();
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&recorder, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();

        let text = Buffer::from("x");
        let flags = CellFlags::from_bits(CellFlags::ALIGN_LEFT | CellFlags::HEADER);
        dispatcher
            .dispatch(&text_event(Construct::TableCell { text: &text, flags }), &mut out)
            .unwrap();

        assert_eq!(
            *recorder.calls.borrow(),
            vec![format!("cell x {:?} header=true", Alignment::Left)]
        );
    }

    #[test]
    fn test_link_title_absent_and_attributes() {
        let recorder = Recorder::default();
        let options =
            RenderOptions::default().with_link_attributes(|_| Some(r#"rel="nofollow""#.to_owned()));
        let mut dispatcher = Dispatcher::new(&recorder, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();

        let content = Buffer::from("site");
        dispatcher
            .dispatch(
                &text_event(Construct::Link {
                    content: &content,
                    link: "https://example.com",
                    title: None,
                }),
                &mut out,
            )
            .unwrap();

        assert_eq!(
            *recorder.calls.borrow(),
            vec![r#"link site https://example.com None Some("rel=\"nofollow\"")"#.to_owned()]
        );
        assert_eq!(out.to_str().unwrap(), "site");
    }

    #[test]
    fn test_suppressed_span_keeps_literal() {
        let recorder = Recorder::default();
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&recorder, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();

        let event = ConstructEvent::new(
            Construct::Autolink {
                link: "me@example.com",
                kind: AutolinkKind::Email,
            },
            0,
            "<me@example.com>",
        );
        dispatcher.dispatch(&event, &mut out).unwrap();

        assert_eq!(out.to_str().unwrap(), "<me@example.com>");
        assert_eq!(
            *recorder.calls.borrow(),
            vec!["autolink me@example.com email=true".to_owned()]
        );
    }

    #[test]
    fn test_block_failure_is_skipped_with_warning() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&Failing, &options);
        let mut out = Buffer::from("before ");
        dispatcher.begin(&mut out).unwrap();

        let text = Buffer::from("body");
        dispatcher
            .dispatch(&text_event(Construct::Paragraph { text: &text }), &mut out)
            .unwrap();

        // Partial output of the failed call is rolled back
        assert_eq!(out.to_str().unwrap(), "before ");
        assert_eq!(dispatcher.phase(), Phase::Rendering);
        assert_eq!(dispatcher.warnings().len(), 1);
        assert!(dispatcher.warnings()[0].contains("paragraph broke"));
    }

    #[test]
    fn test_block_failure_is_fatal_when_strict() {
        let options = RenderOptions::default().with_strict(true);
        let mut dispatcher = Dispatcher::new(&Failing, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();

        let text = Buffer::from("body");
        let err = dispatcher
            .dispatch(&text_event(Construct::Paragraph { text: &text }), &mut out)
            .unwrap_err();
        assert_eq!(err.construct(), Some(ConstructKind::Paragraph));
        assert_eq!(dispatcher.phase(), Phase::Failed);
    }

    #[test]
    fn test_span_failure_is_fatal() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&Failing, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();

        let text = Buffer::from("x");
        let err = dispatcher
            .dispatch(&text_event(Construct::Emphasis { text: &text }), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Renderer {
                construct: ConstructKind::Emphasis,
                offset: 7,
                ..
            }
        ));
        assert_eq!(dispatcher.phase(), Phase::Failed);

        // No further dispatch after a failure
        assert!(
            dispatcher
                .dispatch(&text_event(Construct::LineBreak), &mut out)
                .is_err()
        );
    }

    #[test]
    fn test_invalid_utf8_child_is_marshal_error() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&PassthroughRenderer, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();

        let mut text = Buffer::new();
        text.push_bytes(&[0xc3, 0x28]);
        let err = dispatcher
            .dispatch(&text_event(Construct::Emphasis { text: &text }), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Marshal {
                construct: ConstructKind::Emphasis,
                ..
            }
        ));
    }

    struct BadBytes;

    impl Renderer for BadBytes {
        fn block_quote(&self, _cx: &RenderContext<'_>, out: &mut Buffer, _text: &str) -> BlockResult {
            out.push_bytes(&[0xff, 0xfe]);
            Ok(())
        }

        fn emphasis(&self, _cx: &RenderContext<'_>, _text: &str) -> SpanResult {
            Ok(Span::Emit(Fragment::Bytes(vec![0xff, 0xfe])))
        }
    }

    #[test]
    fn test_invalid_utf8_span_fragment_is_marshal_error() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&BadBytes, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();
        out.push_str("before");

        let text = Buffer::from("x");
        let err = dispatcher
            .dispatch(&text_event(Construct::Emphasis { text: &text }), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Marshal {
                construct: ConstructKind::Emphasis,
                offset: 7,
                ..
            }
        ));
        assert_eq!(out.to_str().unwrap(), "before");
        assert_eq!(dispatcher.phase(), Phase::Failed);
    }

    #[test]
    fn test_invalid_utf8_block_output_is_blamed_on_block() {
        let options = RenderOptions::default();
        let mut dispatcher = Dispatcher::new(&BadBytes, &options);
        let mut out = Buffer::new();
        dispatcher.begin(&mut out).unwrap();
        out.push_str("before");

        let text = Buffer::from("quoted");
        dispatcher
            .dispatch(&text_event(Construct::BlockQuote { text: &text }), &mut out)
            .unwrap();
        assert_eq!(out.to_str().unwrap(), "before");
        assert_eq!(dispatcher.warnings.len(), 1);
        assert!(dispatcher.warnings[0].contains("block_quote"));
    }
}
