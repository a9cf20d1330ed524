//! SmartyPants: typographic punctuation for rendered HTML.
//!
//! Straight quotes become curly quotes, `--` and `---` become dashes, `...`
//! becomes an ellipsis, and `(c)`, `(r)`, `(tm)` and simple fractions become
//! their entities. Tags are copied unchanged, as is everything inside `pre`,
//! `code`, `kbd`, `script`, `style` and `math` elements.

/// Elements whose content is never rewritten.
const VERBATIM_TAGS: &[&str] = &["pre", "code", "var", "samp", "kbd", "math", "script", "style"];

/// Apply SmartyPants to an HTML fragment.
///
/// # Examples
///
/// ```
/// use callmark::html::smartypants;
///
/// assert_eq!(
///     smartypants("<p>They're here...</p>"),
///     "<p>They&rsquo;re here&hellip;</p>"
/// );
/// ```
#[must_use]
pub fn smartypants(html: &str) -> String {
    Smarty::default().run(html)
}

fn word_boundary(c: Option<u8>) -> bool {
    c.is_none_or(|c| c.is_ascii_whitespace() || c.is_ascii_punctuation())
}

fn starts_with_ignore_case(bytes: &[u8], prefix: &[u8]) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[derive(Clone, Copy)]
enum Quote {
    Single,
    Double,
}

/// What to do with the bytes at the cursor.
enum Step {
    /// Copy this many bytes unchanged.
    Skip(usize),
    /// Replace this many bytes with an entity.
    Replace(usize, &'static str),
}

#[derive(Default)]
struct Smarty {
    in_squote: bool,
    in_dquote: bool,
}

impl Smarty {
    fn run(&mut self, html: &str) -> String {
        let bytes = html.as_bytes();
        let mut out = String::with_capacity(html.len());
        let mut copied = 0;
        let mut i = 0;

        while i < bytes.len() {
            let prev = i.checked_sub(1).map(|p| bytes[p]);
            let rest = &bytes[i..];
            let step = match rest[0] {
                b'<' => Some(Step::Skip(tag_len(html, i))),
                b'"' => self.double_quote(prev, rest.get(1).copied(), 1),
                b'\'' => self.single_quote(prev, &rest[1..], 1),
                b'&' if rest.starts_with(b"&quot;") => {
                    self.double_quote(prev, rest.get(6).copied(), 6)
                }
                b'&' if rest.starts_with(b"&#39;") => self.single_quote(prev, &rest[5..], 5),
                b'&' if rest.starts_with(b"&#x27;") => self.single_quote(prev, &rest[6..], 6),
                b'-' => dash(rest),
                b'.' => ellipsis(rest),
                b'(' => symbol(rest),
                b'1' | b'3' => fraction(prev, rest),
                b'`' if rest.starts_with(b"``") => Some(Step::Replace(2, "&ldquo;")),
                _ => None,
            };

            match step {
                Some(Step::Skip(len)) => i += len,
                Some(Step::Replace(len, entity)) => {
                    out.push_str(&html[copied..i]);
                    out.push_str(entity);
                    i += len;
                    copied = i;
                }
                None => i += 1,
            }
        }
        out.push_str(&html[copied..]);
        out
    }

    /// Open or close a quote depending on the surrounding characters.
    fn quote(&mut self, prev: Option<u8>, next: Option<u8>, kind: Quote) -> Option<&'static str> {
        let open = match kind {
            Quote::Single => &mut self.in_squote,
            Quote::Double => &mut self.in_dquote,
        };
        if *open && !word_boundary(next) {
            return None;
        }
        if !*open && !word_boundary(prev) {
            return None;
        }
        let entity = match (kind, *open) {
            (Quote::Single, false) => "&lsquo;",
            (Quote::Single, true) => "&rsquo;",
            (Quote::Double, false) => "&ldquo;",
            (Quote::Double, true) => "&rdquo;",
        };
        *open = !*open;
        Some(entity)
    }

    fn double_quote(&mut self, prev: Option<u8>, next: Option<u8>, len: usize) -> Option<Step> {
        self.quote(prev, next, Quote::Double)
            .map(|entity| Step::Replace(len, entity))
    }

    /// `after` is everything following the quote token.
    fn single_quote(&mut self, prev: Option<u8>, after: &[u8], len: usize) -> Option<Step> {
        let t1 = after.first().map(u8::to_ascii_lowercase);
        let t2 = after.get(1).map(u8::to_ascii_lowercase);

        if len == 1
            && t1 == Some(b'\'')
            && let Some(entity) = self.quote(prev, after.get(1).copied(), Quote::Double)
        {
            return Some(Step::Replace(2, entity));
        }

        // Contractions: 's 't 'm 'd 're 'll 've
        if matches!(t1, Some(b's' | b't' | b'm' | b'd')) && word_boundary(after.get(1).copied()) {
            return Some(Step::Replace(len, "&rsquo;"));
        }
        if matches!(
            (t1, t2),
            (Some(b'r'), Some(b'e')) | (Some(b'l'), Some(b'l')) | (Some(b'v'), Some(b'e'))
        ) && word_boundary(after.get(2).copied())
        {
            return Some(Step::Replace(len, "&rsquo;"));
        }

        self.quote(prev, after.first().copied(), Quote::Single)
            .map(|entity| Step::Replace(len, entity))
    }
}

fn dash(rest: &[u8]) -> Option<Step> {
    if rest.starts_with(b"---") {
        Some(Step::Replace(3, "&mdash;"))
    } else if rest.starts_with(b"--") {
        Some(Step::Replace(2, "&ndash;"))
    } else {
        None
    }
}

fn ellipsis(rest: &[u8]) -> Option<Step> {
    if rest.starts_with(b"...") {
        Some(Step::Replace(3, "&hellip;"))
    } else if rest.starts_with(b". . .") {
        Some(Step::Replace(5, "&hellip;"))
    } else {
        None
    }
}

fn symbol(rest: &[u8]) -> Option<Step> {
    if starts_with_ignore_case(rest, b"(c)") {
        Some(Step::Replace(3, "&copy;"))
    } else if starts_with_ignore_case(rest, b"(r)") {
        Some(Step::Replace(3, "&reg;"))
    } else if starts_with_ignore_case(rest, b"(tm)") {
        Some(Step::Replace(4, "&trade;"))
    } else {
        None
    }
}

fn fraction(prev: Option<u8>, rest: &[u8]) -> Option<Step> {
    if !word_boundary(prev) {
        return None;
    }
    let ends = word_boundary(rest.get(3).copied())
        || rest.get(3..).is_some_and(|tail| starts_with_ignore_case(tail, b"th"));
    if !ends {
        return None;
    }
    match rest.get(..3)? {
        b"1/2" => Some(Step::Replace(3, "&frac12;")),
        b"1/4" => Some(Step::Replace(3, "&frac14;")),
        b"3/4" => Some(Step::Replace(3, "&frac34;")),
        _ => None,
    }
}

/// Length of the tag at `start`, including the content of verbatim elements.
fn tag_len(html: &str, start: usize) -> usize {
    let rest = &html[start..];
    let Some(end) = rest.find('>') else {
        return 1;
    };
    let name = rest[1..end]
        .split(|c: char| !c.is_ascii_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !VERBATIM_TAGS.contains(&name.as_str()) {
        return end + 1;
    }

    let close = format!("</{name}");
    let body = rest[end + 1..].to_ascii_lowercase();
    match body.find(&close) {
        Some(pos) => {
            let close_start = end + 1 + pos;
            rest[close_start..]
                .find('>')
                .map_or(rest.len(), |gt| close_start + gt + 1)
        }
        None => rest.len(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_contractions() {
        assert_eq!(
            smartypants("<p>They're not for sale.</p>\n"),
            "<p>They&rsquo;re not for sale.</p>\n"
        );
        assert_eq!(
            smartypants("<p>Well that'll be the day</p>\n"),
            "<p>Well that&rsquo;ll be the day</p>\n"
        );
        assert_eq!(
            smartypants("<p>I've been meaning to tell you ..</p>\n"),
            "<p>I&rsquo;ve been meaning to tell you ..</p>\n"
        );
        assert_eq!(smartypants("<p>I'm not kidding</p>\n"), "<p>I&rsquo;m not kidding</p>\n");
        assert_eq!(smartypants("<p>what'd you say?</p>\n"), "<p>what&rsquo;d you say?</p>\n");
    }

    #[test]
    fn test_double_quotes_to_curly_quotes() {
        assert_eq!(
            smartypants("<p>\"Quoted text\"</p>\n"),
            "<p>&ldquo;Quoted text&rdquo;</p>\n"
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            smartypants("&quot;a&quot; and &#39;b&#39;"),
            "&ldquo;a&rdquo; and &lsquo;b&rsquo;"
        );
    }

    #[test]
    fn test_dashes_and_ellipsis() {
        assert_eq!(smartypants("a -- b --- c..."), "a &ndash; b &mdash; c&hellip;");
    }

    #[test]
    fn test_symbols_and_fractions() {
        assert_eq!(
            smartypants("(c) (R) (tm) 1/2 3/4 1/4th 11/2"),
            "&copy; &reg; &trade; &frac12; &frac34; &frac14;th 11/2"
        );
    }

    #[test]
    fn test_verbatim_elements_are_skipped() {
        assert_eq!(
            smartypants("<pre><code>\"x\" -- y</code></pre> -- <code>'a'</code>"),
            "<pre><code>\"x\" -- y</code></pre> &ndash; <code>'a'</code>"
        );
    }

    #[test]
    fn test_attributes_are_untouched() {
        assert_eq!(
            smartypants(r#"<a title="x--y">"hi"</a>"#),
            r#"<a title="x--y">&ldquo;hi&rdquo;</a>"#
        );
    }
}
