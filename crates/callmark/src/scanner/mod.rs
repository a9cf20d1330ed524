//! Scanner adapter.
//!
//! Walks a pulldown-cmark offset event stream and reports constructs to the
//! [`Dispatcher`]. Every open construct gets a [`Frame`] with its own buffer;
//! children render into that buffer, and when the construct closes it is
//! dispatched with the finished buffer into its parent. Rendering is thereby
//! bottom-up: a parent always receives its children's output.

mod inline;

use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, LinkType, Tag, TagEnd};

use crate::buffer::Buffer;
use crate::construct::{AutolinkKind, CellFlags, Construct, ConstructEvent, ListFlags};
use crate::dispatch::Dispatcher;
use crate::error::RenderError;
use crate::options::Extensions;
use crate::renderer::Renderer;
use crate::util::heading_level_to_num;

use inline::SegmentKind;

/// Offset event as produced by `Parser::into_offset_iter`.
pub(crate) type OffsetEvent<'s> = (Event<'s>, Range<usize>);

fn malformed(offset: usize, message: impl Into<String>) -> RenderError {
    RenderError::Scanner {
        offset,
        message: message.into(),
    }
}

/// An open construct whose children are still being rendered.
struct Frame<'s> {
    kind: FrameKind<'s>,
    /// Source range of the construct.
    range: Range<usize>,
    buf: Buffer,
}

enum FrameKind<'s> {
    Paragraph,
    Header(u8),
    BlockQuote,
    CodeBlock { info: Option<CowStr<'s>> },
    HtmlBlock,
    List(ListFlags),
    Item(ListFlags),
    Table,
    TableHead,
    TableRow,
    TableCell(CellFlags),
    FootnoteDefinition(CowStr<'s>),
    Emphasis,
    Underline,
    Strong,
    TripleEmphasis,
    Strikethrough,
    Superscript,
    Link { url: CowStr<'s>, title: CowStr<'s> },
    Autolink { url: CowStr<'s>, kind: AutolinkKind },
    Image { url: CowStr<'s>, title: CowStr<'s> },
    /// Not in the catalog; content is kept as rendered.
    Passthrough,
}

impl FrameKind<'_> {
    /// Children are collected as raw text instead of being dispatched.
    fn is_raw(&self) -> bool {
        matches!(
            self,
            Self::CodeBlock { .. } | Self::HtmlBlock | Self::Autolink { .. } | Self::Image { .. }
        )
    }
}

/// Column bookkeeping for the innermost table.
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell_index: usize,
    /// Rendered body rows.
    body: Buffer,
}

impl TableState {
    fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            in_head: false,
            cell_index: 0,
            body: Buffer::new(),
        }
    }

    fn start_row(&mut self) {
        self.cell_index = 0;
    }

    fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    /// Flags for the cell about to open.
    fn cell_flags(&self) -> CellFlags {
        let align = match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => CellFlags::ALIGN_LEFT,
            Some(Alignment::Right) => CellFlags::ALIGN_RIGHT,
            Some(Alignment::Center) => CellFlags::ALIGN_CENTER,
            Some(Alignment::None) | None => 0,
        };
        let header = if self.in_head { CellFlags::HEADER } else { 0 };
        CellFlags::from_bits(align | header)
    }
}

/// Footnote numbering and held-back definitions.
#[derive(Default)]
struct Footnotes {
    numbers: HashMap<String, u32>,
    definitions: HashMap<String, (usize, Buffer)>,
}

impl Footnotes {
    /// Number of the footnote `label`, assigned on first reference.
    fn number(&mut self, label: &str) -> u32 {
        let next = u32::try_from(self.numbers.len() + 1).unwrap_or(u32::MAX);
        *self.numbers.entry(label.to_lowercase()).or_insert(next)
    }

    /// Hold a rendered definition; the first definition of a label wins.
    fn define(&mut self, label: &str, offset: usize, text: Buffer) {
        self.definitions
            .entry(label.to_lowercase())
            .or_insert((offset, text));
    }

    /// Referenced definitions in number order.
    fn into_ordered(self) -> Vec<(u32, usize, Buffer)> {
        let Self {
            numbers,
            definitions,
        } = self;
        let mut notes: Vec<_> = definitions
            .into_iter()
            .filter_map(|(label, (offset, text))| {
                numbers.get(&label).map(|num| (*num, offset, text))
            })
            .collect();
        notes.sort_by_key(|(num, ..)| *num);
        notes
    }
}

/// Adjacent text events merged into one run.
struct TextRun {
    text: String,
    range: Range<usize>,
}

/// Converts one document's event stream into construct events.
pub(crate) struct Scanner<'s> {
    source: &'s str,
    extensions: Extensions,
    doc: Buffer,
    frames: Vec<Frame<'s>>,
    tables: Vec<TableState>,
    footnotes: Footnotes,
    run: Option<TextRun>,
    /// Tags opened inside the innermost raw frame.
    raw_nesting: usize,
    link_depth: usize,
}

impl<'s> Scanner<'s> {
    pub(crate) fn new(source: &'s str, extensions: Extensions) -> Self {
        Self {
            source,
            extensions,
            doc: Buffer::with_capacity(source.len() + source.len() / 2),
            frames: Vec::new(),
            tables: Vec::new(),
            footnotes: Footnotes::default(),
            run: None,
            raw_nesting: 0,
            link_depth: 0,
        }
    }

    /// Render the whole document and return its buffer.
    pub(crate) fn render<R: Renderer + ?Sized>(
        mut self,
        events: Vec<OffsetEvent<'s>>,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<Buffer, RenderError> {
        let partners = match_tags(&events)?;
        let (triple, skip) = self.triple_emphasis(&events, &partners);

        d.begin(&mut self.doc)?;
        for (index, (event, range)) in events.into_iter().enumerate() {
            if skip[index] {
                continue;
            }
            self.event(event, range, triple[index], d)?;
        }
        self.flush_text(d)?;

        if let Some(frame) = self.frames.last() {
            return Err(malformed(frame.range.start, "unclosed construct"));
        }

        self.emit_footnotes(d)?;
        d.end(self.source.len(), &mut self.doc)?;
        Ok(self.doc)
    }

    /// Mark `***x***` pairs: the outer tag becomes a triple emphasis and the
    /// inner tag pair is skipped.
    fn triple_emphasis(
        &self,
        events: &[OffsetEvent<'s>],
        partners: &[Option<usize>],
    ) -> (Vec<bool>, Vec<bool>) {
        let mut triple = vec![false; events.len()];
        let mut skip = vec![false; events.len()];

        for (i, pair) in events.windows(2).enumerate() {
            let [(Event::Start(outer), range), (Event::Start(inner), _)] = pair else {
                continue;
            };
            if !matches!(
                (outer, inner),
                (Tag::Strong, Tag::Emphasis) | (Tag::Emphasis, Tag::Strong)
            ) {
                continue;
            }
            let (Some(outer_end), Some(inner_end)) = (partners[i], partners[i + 1]) else {
                continue;
            };
            let literal = self.literal(range);
            if inner_end + 1 == outer_end
                && (literal.starts_with("***") || literal.starts_with("___"))
            {
                triple[i] = true;
                skip[i + 1] = true;
                skip[inner_end] = true;
            }
        }
        (triple, skip)
    }

    fn event<R: Renderer + ?Sized>(
        &mut self,
        event: Event<'s>,
        range: Range<usize>,
        triple: bool,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        if self.frames.last().is_some_and(|f| f.kind.is_raw()) {
            return self.raw_event(event, range, d);
        }
        match event {
            Event::Text(text) => self.text(text, range, d),
            Event::Start(tag) => {
                self.flush_text(d)?;
                self.start(tag, range, triple, d)
            }
            Event::End(_) => {
                self.flush_text(d)?;
                self.end(range, d)
            }
            leaf => {
                self.flush_text(d)?;
                self.leaf(leaf, range, d)
            }
        }
    }

    /// Event inside code, HTML blocks, image alt text or autolinks.
    fn raw_event<R: Renderer + ?Sized>(
        &mut self,
        event: Event<'s>,
        range: Range<usize>,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        match event {
            Event::Start(_) => self.raw_nesting += 1,
            Event::End(_) if self.raw_nesting > 0 => self.raw_nesting -= 1,
            Event::End(_) => return self.end(range, d),
            Event::Text(text)
            | Event::Code(text)
            | Event::Html(text)
            | Event::InlineHtml(text)
            | Event::InlineMath(text)
            | Event::DisplayMath(text) => self.top().push_str(&text),
            Event::SoftBreak | Event::HardBreak => self.top().push('\n'),
            Event::FootnoteReference(_) | Event::Rule | Event::TaskListMarker(_) => {
                let literal = self.literal(&range);
                self.top().push_str(literal);
            }
        }
        Ok(())
    }

    fn text<R: Renderer + ?Sized>(
        &mut self,
        text: CowStr<'s>,
        range: Range<usize>,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        let literal = self.literal(&range);
        if is_entity(&text, literal) {
            self.flush_text(d)?;
            return self.emit(d, Construct::Entity { text: literal }, range.start, literal);
        }
        match &mut self.run {
            Some(run) => {
                run.text.push_str(&text);
                run.range.end = range.end;
            }
            None => {
                self.run = Some(TextRun {
                    text: text.into_string(),
                    range,
                });
            }
        }
        Ok(())
    }

    /// Dispatch the pending text run, applying inline extensions.
    fn flush_text<R: Renderer + ?Sized>(
        &mut self,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        let Some(run) = self.run.take() else {
            return Ok(());
        };
        let literal = self.literal(&run.range);
        let start = run.range.start;

        if !self.extensions.scans_text() {
            return self.emit(d, Construct::NormalText { text: &run.text }, start, literal);
        }

        let segments = inline::split(&run.text, &self.extensions, self.link_depth == 0);
        if let [only] = segments.as_slice()
            && only.kind == SegmentKind::Text
        {
            return self.emit(d, Construct::NormalText { text: &run.text }, start, literal);
        }

        for segment in segments {
            let offset = start + segment.range.start;
            let whole = &run.text[segment.range.clone()];
            let inner = &run.text[segment.inner.clone()];
            match segment.kind {
                SegmentKind::Text => {
                    self.emit(d, Construct::NormalText { text: whole }, offset, whole)?;
                }
                SegmentKind::Highlight | SegmentKind::Quote => {
                    let mut child = Buffer::new();
                    let inner_offset = start + segment.inner.start;
                    d.dispatch(
                        &ConstructEvent::new(Construct::NormalText { text: inner }, inner_offset, inner),
                        &mut child,
                    )?;
                    let construct = if segment.kind == SegmentKind::Highlight {
                        Construct::Highlight { text: &child }
                    } else {
                        Construct::Quote { text: &child }
                    };
                    self.emit(d, construct, offset, whole)?;
                }
                SegmentKind::Autolink { link, kind } => {
                    self.emit(d, Construct::Autolink { link: &link, kind }, offset, whole)?;
                }
            }
        }
        Ok(())
    }

    fn start<R: Renderer + ?Sized>(
        &mut self,
        tag: Tag<'s>,
        range: Range<usize>,
        triple: bool,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Header(heading_level_to_num(level)),
            Tag::BlockQuote(_) => FrameKind::BlockQuote,
            Tag::CodeBlock(kind) => FrameKind::CodeBlock {
                info: match kind {
                    CodeBlockKind::Fenced(info) => Some(info),
                    CodeBlockKind::Indented => None,
                },
            },
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::List(start) => {
                d.open_list();
                FrameKind::List(ListFlags::list(start.is_some()))
            }
            Tag::Item => match self.frames.last() {
                Some(Frame {
                    kind: FrameKind::List(flags),
                    ..
                }) => FrameKind::Item(*flags),
                _ => return Err(malformed(range.start, "list item outside of a list")),
            },
            Tag::Table(alignments) => {
                self.tables.push(TableState::new(alignments));
                FrameKind::Table
            }
            Tag::TableHead => {
                let table = self.table(range.start)?;
                table.in_head = true;
                table.start_row();
                FrameKind::TableHead
            }
            Tag::TableRow => {
                self.table(range.start)?.start_row();
                FrameKind::TableRow
            }
            Tag::TableCell => FrameKind::TableCell(self.table(range.start)?.cell_flags()),
            Tag::FootnoteDefinition(label) => FrameKind::FootnoteDefinition(label),
            Tag::Emphasis | Tag::Strong if triple => FrameKind::TripleEmphasis,
            Tag::Emphasis
                if self.extensions.underline && self.literal(&range).starts_with('_') =>
            {
                FrameKind::Underline
            }
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Superscript => FrameKind::Superscript,
            Tag::Link {
                link_type: LinkType::Autolink,
                dest_url,
                ..
            } => FrameKind::Autolink {
                url: dest_url,
                kind: AutolinkKind::Url,
            },
            Tag::Link {
                link_type: LinkType::Email,
                dest_url,
                ..
            } => FrameKind::Autolink {
                url: dest_url,
                kind: AutolinkKind::Email,
            },
            Tag::Link {
                dest_url, title, ..
            } => {
                self.link_depth += 1;
                FrameKind::Link {
                    url: dest_url,
                    title,
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                url: dest_url,
                title,
            },
            Tag::Subscript
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_) => FrameKind::Passthrough,
        };
        self.frames.push(Frame {
            kind,
            range,
            buf: Buffer::new(),
        });
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn end<R: Renderer + ?Sized>(
        &mut self,
        end_range: Range<usize>,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        let Some(Frame { kind, range, buf }) = self.frames.pop() else {
            return Err(malformed(end_range.start, "end tag without start"));
        };
        self.raw_nesting = 0;
        let offset = range.start;
        let literal = self.literal(&range);

        match kind {
            FrameKind::Paragraph => {
                if let Some(Frame {
                    kind: FrameKind::Item(flags),
                    ..
                }) = self.frames.last_mut()
                {
                    *flags = flags.with(ListFlags::BLOCK);
                }
                self.emit(d, Construct::Paragraph { text: &buf }, offset, literal)
            }
            FrameKind::Header(level) => {
                self.emit(d, Construct::Header { text: &buf, level }, offset, literal)
            }
            FrameKind::BlockQuote => {
                self.emit(d, Construct::BlockQuote { text: &buf }, offset, literal)
            }
            FrameKind::CodeBlock { info } => {
                let lang = info.as_deref().and_then(|i| i.split_whitespace().next());
                self.emit(d, Construct::BlockCode { text: &buf, lang }, offset, literal)
            }
            FrameKind::HtmlBlock => {
                self.emit(d, Construct::BlockHtml { text: &buf }, offset, literal)
            }
            FrameKind::List(flags) => {
                let result = self.emit(d, Construct::List { text: &buf, flags }, offset, literal);
                d.close_list();
                result
            }
            FrameKind::Item(flags) => {
                self.emit(d, Construct::ListItem { text: &buf, flags }, offset, literal)
            }
            FrameKind::Table => {
                let table = self
                    .tables
                    .pop()
                    .ok_or_else(|| malformed(offset, "table state missing"))?;
                let mut content = buf;
                d.dispatch(
                    &ConstructEvent::new(Construct::TableBody { text: &table.body }, offset, ""),
                    &mut content,
                )?;
                self.emit(d, Construct::Table { content: &content }, offset, literal)
            }
            FrameKind::TableHead => {
                let mut row = Buffer::new();
                d.dispatch(
                    &ConstructEvent::new(Construct::TableRow { text: &buf }, offset, literal),
                    &mut row,
                )?;
                self.table(offset)?.in_head = false;
                self.emit(d, Construct::TableHeader { text: &row }, offset, literal)
            }
            FrameKind::TableRow => {
                let table = self.table(offset)?;
                d.dispatch(
                    &ConstructEvent::new(Construct::TableRow { text: &buf }, offset, literal),
                    &mut table.body,
                )
            }
            FrameKind::TableCell(flags) => {
                self.emit(d, Construct::TableCell { text: &buf, flags }, offset, literal)?;
                self.table(offset)?.next_cell();
                Ok(())
            }
            FrameKind::FootnoteDefinition(label) => {
                self.footnotes.define(&label, offset, buf);
                Ok(())
            }
            FrameKind::Emphasis => {
                self.emit(d, Construct::Emphasis { text: &buf }, offset, literal)
            }
            FrameKind::Underline => {
                self.emit(d, Construct::Underline { text: &buf }, offset, literal)
            }
            FrameKind::Strong => {
                self.emit(d, Construct::DoubleEmphasis { text: &buf }, offset, literal)
            }
            FrameKind::TripleEmphasis => {
                self.emit(d, Construct::TripleEmphasis { text: &buf }, offset, literal)
            }
            FrameKind::Strikethrough => {
                self.emit(d, Construct::Strikethrough { text: &buf }, offset, literal)
            }
            FrameKind::Superscript => {
                self.emit(d, Construct::Superscript { text: &buf }, offset, literal)
            }
            FrameKind::Link { url, title } => {
                self.link_depth = self.link_depth.saturating_sub(1);
                let construct = Construct::Link {
                    content: &buf,
                    link: &url,
                    title: non_empty(&title),
                };
                self.emit(d, construct, offset, literal)
            }
            FrameKind::Autolink { url, kind } => {
                self.emit(d, Construct::Autolink { link: &url, kind }, offset, literal)
            }
            FrameKind::Image { url, title } => {
                let construct = Construct::Image {
                    link: &url,
                    title: non_empty(&title),
                    alt: &buf,
                };
                self.emit(d, construct, offset, literal)
            }
            FrameKind::Passthrough => {
                self.top().push_buffer(&buf);
                Ok(())
            }
        }
    }

    /// Event without children.
    fn leaf<R: Renderer + ?Sized>(
        &mut self,
        event: Event<'s>,
        range: Range<usize>,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        let offset = range.start;
        let literal = self.literal(&range);
        match event {
            Event::Code(text) => self.emit(d, Construct::Codespan { text: &text }, offset, literal),
            Event::InlineMath(text) => {
                let construct = Construct::Math {
                    text: &text,
                    display: false,
                };
                self.emit(d, construct, offset, literal)
            }
            Event::DisplayMath(text) => {
                let construct = Construct::Math {
                    text: &text,
                    display: true,
                };
                self.emit(d, construct, offset, literal)
            }
            Event::Html(text) | Event::InlineHtml(text) => {
                self.emit(d, Construct::RawHtml { text: &text }, offset, literal)
            }
            Event::FootnoteReference(label) => {
                let num = self.footnotes.number(&label);
                self.emit(d, Construct::FootnoteRef { num }, offset, literal)
            }
            Event::SoftBreak => self.emit(d, Construct::NormalText { text: "\n" }, offset, "\n"),
            Event::HardBreak => self.emit(d, Construct::LineBreak, offset, literal),
            Event::Rule => self.emit(d, Construct::HRule, offset, literal),
            Event::TaskListMarker(_) => {
                self.top().push_str(literal);
                Ok(())
            }
            Event::Text(_) | Event::Start(_) | Event::End(_) => Ok(()),
        }
    }

    /// Wrap referenced footnote definitions in one `footnotes` block.
    fn emit_footnotes<R: Renderer + ?Sized>(
        &mut self,
        d: &mut Dispatcher<'_, R>,
    ) -> Result<(), RenderError> {
        let notes = std::mem::take(&mut self.footnotes).into_ordered();
        if notes.is_empty() {
            return Ok(());
        }
        let mut text = Buffer::new();
        for (num, offset, def) in &notes {
            d.dispatch(
                &ConstructEvent::new(
                    Construct::FootnoteDef {
                        text: def,
                        num: *num,
                    },
                    *offset,
                    "",
                ),
                &mut text,
            )?;
        }
        self.emit(d, Construct::Footnotes { text: &text }, self.source.len(), "")
    }

    /// Dispatch into the innermost open buffer.
    fn emit<R: Renderer + ?Sized>(
        &mut self,
        d: &mut Dispatcher<'_, R>,
        construct: Construct<'_>,
        offset: usize,
        literal: &str,
    ) -> Result<(), RenderError> {
        d.dispatch(&ConstructEvent::new(construct, offset, literal), self.top())
    }

    fn top(&mut self) -> &mut Buffer {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.buf,
            None => &mut self.doc,
        }
    }

    fn table(&mut self, offset: usize) -> Result<&mut TableState, RenderError> {
        self.tables
            .last_mut()
            .ok_or_else(|| malformed(offset, "table part outside of a table"))
    }

    fn literal(&self, range: &Range<usize>) -> &'s str {
        self.source.get(range.clone()).unwrap_or_default()
    }
}

/// Pair every start tag with its end tag.
fn match_tags(events: &[OffsetEvent<'_>]) -> Result<Vec<Option<usize>>, RenderError> {
    let mut partners = vec![None; events.len()];
    let mut open: Vec<(usize, TagEnd, usize)> = Vec::new();

    for (index, (event, range)) in events.iter().enumerate() {
        match event {
            Event::Start(tag) => open.push((index, tag.to_end(), range.start)),
            Event::End(end) => {
                let Some((start, expected, _)) = open.pop() else {
                    return Err(malformed(range.start, format!("{end:?} without start")));
                };
                if expected != *end {
                    return Err(malformed(
                        range.start,
                        format!("expected end of {expected:?}, found {end:?}"),
                    ));
                }
                partners[start] = Some(index);
            }
            _ => {}
        }
    }

    match open.pop() {
        Some((_, expected, offset)) => Err(malformed(offset, format!("unclosed {expected:?}"))),
        None => Ok(partners),
    }
}

/// A text event decoded from a character reference such as `&copy;`.
fn is_entity(text: &str, literal: &str) -> bool {
    literal.len() > 2 && literal.starts_with('&') && literal.ends_with(';') && text != literal
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
