//! Helpful utilities for working with text.

use htmlentity::entity::{self, ICodedDataTrait};

/// Converts HTML entities into their single-character equivalents.
///
/// Reddit escapes "&", "<", and ">" in titles, self text, and comment
/// bodies even in its JSON API; this function turns them back into
/// human-readable characters. Leading and trailing whitespace is trimmed.
///
/// # Examples
///
/// ```
/// use redditstream::text::convert_html_entities;
/// let raw = "  &lt;This &amp; That&gt;  ";
/// assert_eq!(convert_html_entities(raw), "<This & That>");
/// ```
///
/// ```
/// use redditstream::text::convert_html_entities;
/// assert_eq!(convert_html_entities(""), "");
/// ```
pub fn convert_html_entities(text: &str) -> String {
    let text = text.trim();
    entity::decode(text.as_bytes())
        .to_string()
        .unwrap_or(text.to_string())
}

/// Prefixes the first line of `text` with `first` and every following line
/// with `rest`, joining the result with newlines.
///
/// Blank lines stay blank rather than picking up trailing whitespace.
///
/// # Examples
///
/// ```
/// use redditstream::text::hanging_indent;
/// let text = "first\nsecond\n\nthird";
/// let actual = hanging_indent(text, "   -  ", "      ");
/// assert_eq!(actual, "   -  first\n      second\n\n      third");
/// ```
pub fn hanging_indent(text: &str, first: &str, rest: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| match (i, line.is_empty()) {
            (0, _) => format!("{first}{line}"),
            (_, true) => String::new(),
            (_, false) => format!("{rest}{line}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
