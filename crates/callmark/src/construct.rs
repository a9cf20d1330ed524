//! Construct catalog: every construct kind the scanner reports, with its payload.
//!
//! Constructs fall into three categories:
//! - **Block**: rendered by appending to the enclosing buffer.
//! - **Span**: rendered into a fragment substituted in place of the span,
//!   or suppressed so the literal source text is kept.
//! - **Low-level**: literal text and entities, handled like spans.
//!
//! The catalog follows one fixed protocol: tables are reported as
//! `table(content)`, `table_header(text)`, `table_body(text)`,
//! `table_row(text)` and `table_cell(text, cell)`, and links are reported
//! content first, as `link(content, link, title)`.

use std::fmt;

use crate::buffer::Buffer;

/// Category of a construct kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Appends to the running output; no substitution.
    Block,
    /// Inline construct substituted into the enclosing text.
    Span,
    /// Literal text and entities.
    LowLevel,
}

macro_rules! construct_kinds {
    ($($category:ident { $($variant:ident => $name:literal,)+ })+) => {
        /// Every construct kind, in catalog order.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ConstructKind {
            $($($variant,)+)+
        }

        impl ConstructKind {
            /// All kinds in catalog order.
            pub const ALL: &'static [ConstructKind] = &[$($(ConstructKind::$variant,)+)+];

            /// Name of the construct, identical to the renderer method name.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $($(ConstructKind::$variant => $name,)+)+
                }
            }

            /// Category the construct belongs to.
            #[must_use]
            pub fn category(self) -> Category {
                match self {
                    $($(ConstructKind::$variant => Category::$category,)+)+
                }
            }
        }
    };
}

construct_kinds! {
    Block {
        BlockCode => "block_code",
        BlockQuote => "block_quote",
        BlockHtml => "block_html",
        Header => "header",
        HRule => "hrule",
        List => "list",
        ListItem => "list_item",
        Paragraph => "paragraph",
        Table => "table",
        TableHeader => "table_header",
        TableBody => "table_body",
        TableRow => "table_row",
        TableCell => "table_cell",
        Footnotes => "footnotes",
        FootnoteDef => "footnote_def",
    }
    Span {
        Autolink => "autolink",
        Codespan => "codespan",
        DoubleEmphasis => "double_emphasis",
        Emphasis => "emphasis",
        Underline => "underline",
        Highlight => "highlight",
        Quote => "quote",
        Image => "image",
        LineBreak => "linebreak",
        Link => "link",
        RawHtml => "raw_html",
        TripleEmphasis => "triple_emphasis",
        Strikethrough => "strikethrough",
        Superscript => "superscript",
        FootnoteRef => "footnote_ref",
        Math => "math",
    }
    LowLevel {
        Entity => "entity",
        NormalText => "normal_text",
    }
    Block {
        DocHeader => "doc_header",
        DocFooter => "doc_footer",
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scanner-side list flags.
///
/// The renderer only ever sees [`ListFlags::is_ordered`]; every other bit is
/// dropped at the dispatch boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ListFlags(u8);

impl ListFlags {
    /// The list is ordered.
    pub const ORDERED: u8 = 1;
    /// The item contains block content (loose list item).
    pub const BLOCK: u8 = 2;

    /// Flags from raw bits.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Flags for an ordered or unordered list.
    #[must_use]
    pub fn list(ordered: bool) -> Self {
        Self(if ordered { Self::ORDERED } else { 0 })
    }

    /// Raw bits.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether the list is ordered.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        self.0 & Self::ORDERED != 0
    }

    /// Return a copy with `bit` set.
    #[must_use]
    pub fn with(self, bit: u8) -> Self {
        Self(self.0 | bit)
    }
}

/// Scanner-side table cell flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellFlags(u8);

impl CellFlags {
    /// Left-aligned column.
    pub const ALIGN_LEFT: u8 = 1;
    /// Right-aligned column.
    pub const ALIGN_RIGHT: u8 = 2;
    /// Centered column (both alignment bits).
    pub const ALIGN_CENTER: u8 = 3;
    /// Mask covering the alignment bits.
    pub const ALIGN_MASK: u8 = 3;
    /// Cell belongs to the header row.
    pub const HEADER: u8 = 4;

    /// Flags from raw bits.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Normalize to the shape renderers receive.
    #[must_use]
    pub fn normalize(self) -> TableCell {
        let align = match self.0 & Self::ALIGN_MASK {
            Self::ALIGN_LEFT => Alignment::Left,
            Self::ALIGN_RIGHT => Alignment::Right,
            Self::ALIGN_CENTER => Alignment::Center,
            _ => Alignment::None,
        };
        TableCell {
            align,
            header: self.0 & Self::HEADER != 0,
        }
    }
}

/// Column alignment of a table cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// No explicit alignment.
    #[default]
    None,
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
}

/// Normalized table cell attributes passed to renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TableCell {
    /// Column alignment.
    pub align: Alignment,
    /// Whether the cell is part of the header row.
    pub header: bool,
}

/// Kind of an autolink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutolinkKind {
    /// A URL (`<https://example.com>` or a bare URL).
    Url,
    /// An email address (`<me@example.com>`).
    Email,
}

/// A construct with its payload.
///
/// Child content arrives as already-rendered [`Buffer`]s; everything else is
/// borrowed from the source. Optional text is `None` when absent, never an
/// empty string.
#[derive(Clone, Copy, Debug)]
pub enum Construct<'a> {
    BlockCode { text: &'a Buffer, lang: Option<&'a str> },
    BlockQuote { text: &'a Buffer },
    BlockHtml { text: &'a Buffer },
    Header { text: &'a Buffer, level: u8 },
    HRule,
    List { text: &'a Buffer, flags: ListFlags },
    ListItem { text: &'a Buffer, flags: ListFlags },
    Paragraph { text: &'a Buffer },
    Table { content: &'a Buffer },
    TableHeader { text: &'a Buffer },
    TableBody { text: &'a Buffer },
    TableRow { text: &'a Buffer },
    TableCell { text: &'a Buffer, flags: CellFlags },
    Footnotes { text: &'a Buffer },
    FootnoteDef { text: &'a Buffer, num: u32 },
    Autolink { link: &'a str, kind: AutolinkKind },
    Codespan { text: &'a str },
    DoubleEmphasis { text: &'a Buffer },
    Emphasis { text: &'a Buffer },
    Underline { text: &'a Buffer },
    Highlight { text: &'a Buffer },
    Quote { text: &'a Buffer },
    Image { link: &'a str, title: Option<&'a str>, alt: &'a Buffer },
    LineBreak,
    Link { content: &'a Buffer, link: &'a str, title: Option<&'a str> },
    RawHtml { text: &'a str },
    TripleEmphasis { text: &'a Buffer },
    Strikethrough { text: &'a Buffer },
    Superscript { text: &'a Buffer },
    FootnoteRef { num: u32 },
    Math { text: &'a str, display: bool },
    Entity { text: &'a str },
    NormalText { text: &'a str },
    DocHeader,
    DocFooter,
}

impl Construct<'_> {
    /// Kind of this construct.
    #[must_use]
    pub fn kind(&self) -> ConstructKind {
        match self {
            Self::BlockCode { .. } => ConstructKind::BlockCode,
            Self::BlockQuote { .. } => ConstructKind::BlockQuote,
            Self::BlockHtml { .. } => ConstructKind::BlockHtml,
            Self::Header { .. } => ConstructKind::Header,
            Self::HRule => ConstructKind::HRule,
            Self::List { .. } => ConstructKind::List,
            Self::ListItem { .. } => ConstructKind::ListItem,
            Self::Paragraph { .. } => ConstructKind::Paragraph,
            Self::Table { .. } => ConstructKind::Table,
            Self::TableHeader { .. } => ConstructKind::TableHeader,
            Self::TableBody { .. } => ConstructKind::TableBody,
            Self::TableRow { .. } => ConstructKind::TableRow,
            Self::TableCell { .. } => ConstructKind::TableCell,
            Self::Footnotes { .. } => ConstructKind::Footnotes,
            Self::FootnoteDef { .. } => ConstructKind::FootnoteDef,
            Self::Autolink { .. } => ConstructKind::Autolink,
            Self::Codespan { .. } => ConstructKind::Codespan,
            Self::DoubleEmphasis { .. } => ConstructKind::DoubleEmphasis,
            Self::Emphasis { .. } => ConstructKind::Emphasis,
            Self::Underline { .. } => ConstructKind::Underline,
            Self::Highlight { .. } => ConstructKind::Highlight,
            Self::Quote { .. } => ConstructKind::Quote,
            Self::Image { .. } => ConstructKind::Image,
            Self::LineBreak => ConstructKind::LineBreak,
            Self::Link { .. } => ConstructKind::Link,
            Self::RawHtml { .. } => ConstructKind::RawHtml,
            Self::TripleEmphasis { .. } => ConstructKind::TripleEmphasis,
            Self::Strikethrough { .. } => ConstructKind::Strikethrough,
            Self::Superscript { .. } => ConstructKind::Superscript,
            Self::FootnoteRef { .. } => ConstructKind::FootnoteRef,
            Self::Math { .. } => ConstructKind::Math,
            Self::Entity { .. } => ConstructKind::Entity,
            Self::NormalText { .. } => ConstructKind::NormalText,
            Self::DocHeader => ConstructKind::DocHeader,
            Self::DocFooter => ConstructKind::DocFooter,
        }
    }
}

/// A construct as reported by the scanner.
#[derive(Clone, Copy, Debug)]
pub struct ConstructEvent<'a> {
    /// The construct and its payload.
    pub construct: Construct<'a>,
    /// Byte offset of the construct in the source document.
    pub offset: usize,
    /// Literal source text, emitted instead when a span is suppressed.
    pub literal: &'a str,
}

impl<'a> ConstructEvent<'a> {
    /// Create an event.
    #[must_use]
    pub fn new(construct: Construct<'a>, offset: usize, literal: &'a str) -> Self {
        Self {
            construct,
            offset,
            literal,
        }
    }
}
