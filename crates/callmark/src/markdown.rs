//! Render entry points.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser};

use crate::dispatch::{Dispatcher, RenderResult};
use crate::error::RenderError;
use crate::options::{Extensions, RenderOptions};
use crate::renderer::Renderer;
use crate::scanner::Scanner;

/// Render `text` with `renderer`.
///
/// # Examples
///
/// ```
/// use callmark::{HtmlRenderer, RenderOptions, render};
///
/// let result = render("hello *world*", &HtmlRenderer::default(), &RenderOptions::default()).unwrap();
/// assert_eq!(result.output, "<p>hello <em>world</em></p>\n");
/// ```
pub fn render<R: Renderer + ?Sized>(
    text: &str,
    renderer: &R,
    options: &RenderOptions,
) -> Result<RenderResult, RenderError> {
    let events = Parser::new_ext(text, options.extensions.parser_options()).into_offset_iter();
    render_events(text, events, renderer, options)
}

fn render_events<'s, R, I>(
    source: &'s str,
    events: I,
    renderer: &R,
    options: &RenderOptions,
) -> Result<RenderResult, RenderError>
where
    R: Renderer + ?Sized,
    I: IntoIterator<Item = (Event<'s>, Range<usize>)>,
{
    let mut dispatcher = Dispatcher::new(renderer, options);
    let doc = Scanner::new(source, options.extensions).render(events.into_iter().collect(), &mut dispatcher)?;
    dispatcher.finish(doc)
}

/// Markdown renderer builder.
///
/// Borrows the renderer for the whole render; the same builder can render
/// any number of documents.
///
/// # Examples
///
/// ```
/// use callmark::{Extensions, HtmlRenderer, Markdown};
///
/// let html = HtmlRenderer::default();
/// let result = Markdown::new(&html)
///     .with_extensions(Extensions::gfm())
///     .with_link_attributes(|url| url.starts_with("http").then(|| r#"rel="nofollow""#.to_owned()))
///     .render("See https://example.com")
///     .unwrap();
/// assert_eq!(
///     result.output,
///     "<p>See <a href=\"https://example.com\" rel=\"nofollow\">https://example.com</a></p>\n"
/// );
/// ```
pub struct Markdown<'r, R: Renderer + ?Sized> {
    renderer: &'r R,
    options: RenderOptions,
}

impl<'r, R: Renderer + ?Sized> Markdown<'r, R> {
    /// Create a builder with default options and no extensions.
    pub fn new(renderer: &'r R) -> Self {
        Self {
            renderer,
            options: RenderOptions::default(),
        }
    }

    /// Enable Markdown extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.options.extensions = extensions;
        self
    }

    /// Replace all render options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Install a hook returning extra attributes for link and image URLs.
    #[must_use]
    pub fn with_link_attributes<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.options = self.options.with_link_attributes(hook);
        self
    }

    /// Make block construct failures abort the render.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Set the deepest relative header level tracked for the table of contents.
    #[must_use]
    pub fn with_toc_nesting_level(mut self, level: u8) -> Self {
        self.options.toc_nesting_level = level;
        self
    }

    /// Render options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Parser options matching the enabled extensions.
    pub fn parser_options(&self) -> Options {
        self.options.extensions.parser_options()
    }

    /// Parse and render `text`.
    pub fn render(&self, text: &str) -> Result<RenderResult, RenderError> {
        render(text, self.renderer, &self.options)
    }

    /// Render an offset event stream produced from `source`.
    ///
    /// Use this to render events from a parser configured by the caller;
    /// offsets must refer to `source`.
    pub fn render_events<'s, I>(&self, source: &'s str, events: I) -> Result<RenderResult, RenderError>
    where
        I: IntoIterator<Item = (Event<'s>, Range<usize>)>,
    {
        render_events(source, events, self.renderer, &self.options)
    }
}
