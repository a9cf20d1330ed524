//! Per-render state and the context handed to renderer methods.

use crate::options::{DEFAULT_TOC_NESTING_LEVEL, Extensions};

/// Document position bookkeeping for one render.
///
/// Only the dispatcher mutates it, in response to header and list
/// constructs; renderers observe it through [`RenderContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderState {
    /// Number of headers seen so far, including the one being rendered.
    header_count: usize,
    /// Relative level of the latest header within the nesting limit (0 before any).
    current_level: u8,
    /// `current_level` before the latest header.
    previous_level: u8,
    /// Relative level of the header being rendered.
    header_level: u8,
    /// Offset subtracted from absolute levels (first header level minus one).
    level_offset: u8,
    /// Deepest relative level tracked for the table of contents.
    nesting_level: u8,
    /// Number of enclosing lists.
    list_depth: usize,
}

impl RenderState {
    /// Fresh state with the given nesting limit.
    #[must_use]
    pub fn new(nesting_level: u8) -> Self {
        Self {
            header_count: 0,
            current_level: 0,
            previous_level: 0,
            header_level: 0,
            level_offset: 0,
            nesting_level,
            list_depth: 0,
        }
    }

    /// Record a header of absolute `level` about to be rendered.
    pub(crate) fn enter_header(&mut self, level: u8) {
        self.header_count += 1;
        if self.header_count == 1 {
            self.level_offset = level.saturating_sub(1);
        }
        let relative = level.saturating_sub(self.level_offset).max(1);
        self.header_level = relative;
        self.previous_level = self.current_level;
        if relative <= self.nesting_level {
            self.current_level = relative;
        }
    }

    pub(crate) fn open_list(&mut self) {
        self.list_depth += 1;
    }

    pub(crate) fn close_list(&mut self) {
        self.list_depth = self.list_depth.saturating_sub(1);
    }

    /// Headers seen so far; the Nth header observes `N`.
    #[must_use]
    pub fn header_count(&self) -> usize {
        self.header_count
    }

    /// Relative level of the latest header within the nesting limit.
    #[must_use]
    pub fn current_level(&self) -> u8 {
        self.current_level
    }

    /// `current_level` before the latest header.
    #[must_use]
    pub fn previous_level(&self) -> u8 {
        self.previous_level
    }

    /// Relative level of the latest header, even beyond the nesting limit.
    #[must_use]
    pub fn header_level(&self) -> u8 {
        self.header_level
    }

    /// Offset between absolute and relative header levels.
    #[must_use]
    pub fn level_offset(&self) -> u8 {
        self.level_offset
    }

    /// Deepest relative level tracked for the table of contents.
    #[must_use]
    pub fn nesting_level(&self) -> u8 {
        self.nesting_level
    }

    /// Number of lists enclosing the construct being rendered.
    #[must_use]
    pub fn list_depth(&self) -> usize {
        self.list_depth
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(DEFAULT_TOC_NESTING_LEVEL)
    }
}

/// Context passed to every renderer method.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    state: &'a RenderState,
    extensions: &'a Extensions,
    link_attributes: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    /// Create a context.
    #[must_use]
    pub fn new(
        state: &'a RenderState,
        extensions: &'a Extensions,
        link_attributes: Option<&'a str>,
    ) -> Self {
        Self {
            state,
            extensions,
            link_attributes,
        }
    }

    /// Render state at the time of the call.
    #[must_use]
    pub fn state(&self) -> &'a RenderState {
        self.state
    }

    /// Extensions enabled for this render.
    #[must_use]
    pub fn extensions(&self) -> &'a Extensions {
        self.extensions
    }

    /// Extra attributes for the link or image being rendered.
    #[must_use]
    pub fn link_attributes(&self) -> Option<&'a str> {
        self.link_attributes
    }

    /// Shortcut for [`RenderState::header_count`].
    #[must_use]
    pub fn header_count(&self) -> usize {
        self.state.header_count()
    }

    /// Shortcut for [`RenderState::list_depth`].
    #[must_use]
    pub fn list_depth(&self) -> usize {
        self.state.list_depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_count_is_one_indexed() {
        let mut state = RenderState::default();
        assert_eq!(state.header_count(), 0);
        state.enter_header(2);
        assert_eq!(state.header_count(), 1);
        state.enter_header(3);
        assert_eq!(state.header_count(), 2);
    }

    #[test]
    fn test_level_offset_from_first_header() {
        let mut state = RenderState::default();
        state.enter_header(2);
        assert_eq!(state.level_offset(), 1);
        assert_eq!(state.current_level(), 1);
        assert_eq!(state.previous_level(), 0);

        state.enter_header(3);
        assert_eq!(state.current_level(), 2);
        assert_eq!(state.previous_level(), 1);

        // Shallower than the first header clamps to level 1
        state.enter_header(1);
        assert_eq!(state.current_level(), 1);
        assert_eq!(state.header_level(), 1);
    }

    #[test]
    fn test_nesting_limit_keeps_current_level() {
        let mut state = RenderState::new(2);
        state.enter_header(1);
        state.enter_header(3);
        assert_eq!(state.header_level(), 3);
        assert_eq!(state.current_level(), 1);
        assert_eq!(state.previous_level(), 1);
    }

    #[test]
    fn test_list_depth() {
        let mut state = RenderState::default();
        state.open_list();
        state.open_list();
        assert_eq!(state.list_depth(), 2);
        state.close_list();
        state.close_list();
        state.close_list();
        assert_eq!(state.list_depth(), 0);
    }

    #[test]
    fn test_context_accessors() {
        let mut state = RenderState::default();
        state.enter_header(1);
        let extensions = Extensions::all();
        let cx = RenderContext::new(&state, &extensions, Some("rel=\"nofollow\""));
        assert_eq!(cx.header_count(), 1);
        assert_eq!(cx.list_depth(), 0);
        assert!(cx.extensions().tables);
        assert_eq!(cx.link_attributes(), Some("rel=\"nofollow\""));
    }
}
