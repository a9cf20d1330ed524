//! Markdown rendering through pluggable, per-construct renderers.
//!
//! A [`Renderer`] has one method per Markdown construct. While a document is
//! parsed, every recognized construct is dispatched to the matching method,
//! which decides what the construct turns into. Rendering is bottom-up: a
//! paragraph's method receives its already-rendered inline content, a list
//! receives its rendered items, and so on.
//!
//! # Architecture
//!
//! - The scanner adapts the pulldown-cmark event stream into
//!   construct events and composes child buffers into parents.
//! - [`Dispatcher`] resolves each [`ConstructEvent`] to a [`Renderer`]
//!   method, keeps the [`RenderState`] and applies the error policy: block
//!   failures are skipped with a warning, span failures abort the render.
//! - [`Markdown`] and [`render`] tie the two together.
//!
//! Bundled renderers:
//! - [`HtmlRenderer`]: HTML output, configured with [`HtmlFlags`]
//! - [`HtmlTocRenderer`]: nested table of contents from headers
//! - [`CanonicalRenderer`]: normalized Markdown
//! - [`PassthroughRenderer`]: plain text, using every default method
//!
//! # Example
//!
//! ```
//! use callmark::{Buffer, BlockResult, Markdown, RenderContext, Renderer, Span, SpanResult};
//!
//! struct Shouty;
//!
//! impl Renderer for Shouty {
//!     fn paragraph(&self, _cx: &RenderContext<'_>, out: &mut Buffer, text: &str) -> BlockResult {
//!         out.push_str(&text.to_uppercase());
//!         out.push('\n');
//!         Ok(())
//!     }
//!
//!     fn emphasis(&self, _cx: &RenderContext<'_>, text: &str) -> SpanResult {
//!         Ok(Span::emit(format!("{text}!")))
//!     }
//! }
//!
//! let result = Markdown::new(&Shouty).render("hello *world*").unwrap();
//! assert_eq!(result.output, "HELLO WORLD!\n");
//! ```

mod buffer;
pub mod canonical;
mod construct;
mod dispatch;
mod error;
pub mod html;
mod markdown;
mod options;
mod renderer;
mod scanner;
mod state;
mod util;

pub use buffer::{Buffer, Fragment};
pub use canonical::CanonicalRenderer;
pub use construct::{
    Alignment, AutolinkKind, Category, CellFlags, Construct, ConstructEvent, ConstructKind,
    ListFlags, TableCell,
};
pub use dispatch::{Dispatcher, Phase, RenderResult};
pub use error::{RenderError, RendererError};
pub use html::{HtmlFlags, HtmlRenderer, HtmlTocRenderer, escape_href, smartypants};
pub use markdown::{Markdown, render};
pub use options::{DEFAULT_TOC_NESTING_LEVEL, Extensions, LinkAttributes, RenderOptions};
pub use renderer::{BlockResult, PassthroughRenderer, Renderer, Span, SpanResult};
pub use state::{RenderContext, RenderState};
pub use util::escape_html;
