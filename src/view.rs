//! Draws viewable objects into a terminal window.

use crate::reddit::thing::Post;
use crate::text::hanging_indent;
use colored::Colorize;

const POST_RULE_WIDTH: usize = 72;
const TITLE_RULE_WIDTH: usize = 90;
const COMMENT_BULLET: &str = "   -  ";
const COMMENT_INDENT: &str = "      ";

/// View renderer options.
#[derive(Debug, Default)]
pub struct ViewOptions {
    wrap: Option<usize>,
    selftext: bool,
}

impl ViewOptions {
    /// Incrementally builds a new set of view options.
    ///
    /// # Examples
    ///
    /// ```
    /// use redditstream::view::ViewOptions;
    /// let opts = ViewOptions::build().wrap(Some(80)).selftext(true).build();
    /// ```
    pub fn build() -> ViewOptionsBuilder {
        ViewOptionsBuilder::default()
    }
}

/// A builder for view options.
///
/// You probably don't want to use this directly; call [`ViewOptions::build()`]
/// and construct it incrementally instead.
#[derive(Debug, Default)]
#[must_use]
pub struct ViewOptionsBuilder {
    wrap: Option<usize>,
    selftext: bool,
}

impl ViewOptionsBuilder {
    /// Wraps comment text to the given width, or not at all if `None`.
    pub fn wrap(mut self, wrap: Option<usize>) -> Self {
        self.wrap = wrap;
        self
    }

    /// Wraps comment text to the width of the terminal.
    pub fn wrap_to_terminal(self) -> Self {
        let width = textwrap::termwidth();
        self.wrap(Some(width))
    }

    /// Shows the body of self posts under their titles.
    pub fn selftext(mut self, selftext: bool) -> Self {
        self.selftext = selftext;
        self
    }

    /// Finalizes the [`ViewOptions`].
    pub fn build(self) -> ViewOptions {
        ViewOptions {
            wrap: self.wrap,
            selftext: self.selftext,
        }
    }
}

/// Marks an item that can be converted into a string for display on a terminal.
pub trait Viewable {
    /// Converts the item into a string for display on a terminal.
    fn view(&self, opts: &ViewOptions) -> String;
}

impl Viewable for Post {
    fn view(&self, opts: &ViewOptions) -> String {
        let mut lines = vec![
            "#".repeat(POST_RULE_WIDTH).red().to_string(),
            "-".repeat(TITLE_RULE_WIDTH).cyan().to_string(),
            format!("### {}", self.title()),
            self.url().to_string(),
        ];

        if opts.selftext && !self.selftext().is_empty() {
            lines.push(wrap(self.selftext(), opts.wrap, "", ""));
        }

        if let Some(err) = self.comment_error() {
            let msg = format!("(comments unavailable: {err})");
            lines.push(format!("{COMMENT_BULLET}{}", msg.dimmed()));
        } else {
            lines.extend(
                self.comments()
                    .iter()
                    .map(|comment| wrap(comment, opts.wrap, COMMENT_BULLET, COMMENT_INDENT)),
            );
        }

        lines.join("\n")
    }
}

fn wrap(text: &str, width: Option<usize>, first: &str, rest: &str) -> String {
    match width {
        Some(width) => {
            let options = textwrap::Options::new(width)
                .initial_indent(first)
                .subsequent_indent(rest);
            textwrap::fill(text, options)
        }
        None => hanging_indent(text, first, rest),
    }
}
