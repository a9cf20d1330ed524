//! Render options and Markdown extensions.

use std::fmt;
use std::sync::Arc;

use pulldown_cmark::Options;

/// Hook returning extra attributes for a link or image URL.
///
/// The returned text is inserted verbatim into the tag by renderers that
/// support it, e.g. `rel="nofollow"`.
pub type LinkAttributes = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Default maximum header depth tracked for the table of contents.
pub const DEFAULT_TOC_NESTING_LEVEL: u8 = 6;

/// Markdown extensions recognized by the scanner.
///
/// Fenced code blocks are always recognized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct Extensions {
    /// Pipe tables.
    pub tables: bool,
    /// `[^label]` footnotes.
    pub footnotes: bool,
    /// `~~text~~`
    pub strikethrough: bool,
    /// `^text^`
    pub superscript: bool,
    /// `$inline$` and `$$display$$` math.
    pub math: bool,
    /// Bare `http://`, `https://` and `www.` URLs become autolinks.
    pub autolink: bool,
    /// `_text_` is reported as underline instead of emphasis.
    pub underline: bool,
    /// `==text==`
    pub highlight: bool,
    /// `"text"` is reported as a quote span.
    pub quote: bool,
}

impl Extensions {
    /// No extensions.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// GitHub Flavored Markdown subset: tables, strikethrough and autolinks.
    #[must_use]
    pub fn gfm() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            ..Self::default()
        }
    }

    /// Every extension.
    #[must_use]
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            superscript: true,
            math: true,
            autolink: true,
            underline: true,
            highlight: true,
            quote: true,
        }
    }

    /// Parser options enabling the extensions the scanner implements.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_SUPERSCRIPT, self.superscript);
        options.set(Options::ENABLE_MATH, self.math);
        options
    }

    /// Whether any extension works on merged text runs.
    pub(crate) fn scans_text(&self) -> bool {
        self.autolink || self.highlight || self.quote
    }
}

/// Options for one render.
#[derive(Clone)]
pub struct RenderOptions {
    /// Enabled Markdown extensions.
    pub extensions: Extensions,
    /// Deepest relative header level tracked for the table of contents.
    pub toc_nesting_level: u8,
    /// Abort the render when a block construct fails instead of skipping it.
    pub strict: bool,
    /// Extra attributes for links and images.
    pub link_attributes: Option<LinkAttributes>,
}

impl RenderOptions {
    /// Options with the given extensions.
    #[must_use]
    pub fn new(extensions: Extensions) -> Self {
        Self {
            extensions,
            ..Self::default()
        }
    }

    /// Set the table of contents nesting level.
    #[must_use]
    pub fn with_toc_nesting_level(mut self, level: u8) -> Self {
        self.toc_nesting_level = level;
        self
    }

    /// Make block construct failures abort the render.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Install a link attribute hook.
    #[must_use]
    pub fn with_link_attributes<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.link_attributes = Some(Arc::new(hook));
        self
    }

    /// Run the link attribute hook for `url`.
    pub(crate) fn link_attributes_for(&self, url: &str) -> Option<String> {
        self.link_attributes.as_ref().and_then(|hook| hook(url))
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            extensions: Extensions::default(),
            toc_nesting_level: DEFAULT_TOC_NESTING_LEVEL,
            strict: false,
            link_attributes: None,
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("extensions", &self.extensions)
            .field("toc_nesting_level", &self.toc_nesting_level)
            .field("strict", &self.strict)
            .field("link_attributes", &self.link_attributes.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_extensions_by_default() {
        let options = Extensions::default().parser_options();
        assert!(options.is_empty());
    }

    #[test]
    fn test_parser_options_for_all() {
        let options = Extensions::all().parser_options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_FOOTNOTES));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(options.contains(Options::ENABLE_SUPERSCRIPT));
        assert!(options.contains(Options::ENABLE_MATH));
    }

    #[test]
    fn test_gfm_subset() {
        let ext = Extensions::gfm();
        assert!(ext.tables && ext.strikethrough && ext.autolink);
        assert!(!ext.footnotes && !ext.underline);
        assert!(ext.scans_text());
        assert!(!Extensions::none().scans_text());
    }

    #[test]
    fn test_link_attributes_hook() {
        let options = RenderOptions::default().with_link_attributes(|url| {
            url.starts_with("http").then(|| r#"rel="nofollow""#.to_owned())
        });
        assert_eq!(
            options.link_attributes_for("https://example.com").as_deref(),
            Some(r#"rel="nofollow""#)
        );
        assert_eq!(options.link_attributes_for("/local"), None);
        assert_eq!(RenderOptions::default().link_attributes_for("x"), None);
    }

    #[test]
    fn test_debug_hides_hook() {
        let options = RenderOptions::default().with_link_attributes(|_| None);
        let debug = format!("{options:?}");
        assert!(debug.contains("link_attributes: true"));
    }
}
