//! Reading time estimation.
//!
//! Turns raw content into a word count and the word count into minutes.
//! Everything here is pure: no I/O, no shared state, same input same output.
//!
//! # Word rule
//!
//! Markup is removed first (see [`strip_markup`]). In the remaining text a
//! word is a maximal run of Unicode alphabetic characters (combining marks
//! may follow a letter). A single apostrophe (`'` or `’`) or hyphen between two
//! letters joins the run, so `don't`, `well-known` and `mother-in-law` each
//! count once. Digits, punctuation and other symbols separate words and are
//! not words themselves: `2024` counts as zero words.

use std::num::NonZeroUsize;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};
use serde::Serialize;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Alphabetic}[\p{Alphabetic}\p{M}]*(?:['’-]\p{Alphabetic}[\p{Alphabetic}\p{M}]*)*")
        .unwrap()
});

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that sit inside a run of text without breaking a word.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

/// The result of estimating one piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub word_count: usize,
    pub minutes: usize,
}

impl Estimate {
    /// Estimates `content`, which may contain HTML markup.
    pub fn of(content: &str, words_per_minute: NonZeroUsize) -> Self {
        let word_count = count_words(&strip_markup(content));
        let minutes = minutes_for(word_count, words_per_minute);
        tracing::trace!(word_count, minutes, "estimated reading time");
        Self {
            word_count,
            minutes,
        }
    }
}

/// Minutes needed to read `content` at `words_per_minute`. Never less than 1.
pub fn estimate(content: &str, words_per_minute: NonZeroUsize) -> usize {
    Estimate::of(content, words_per_minute).minutes
}

/// `ceil(word_count / words_per_minute)`, clamped to at least one minute.
pub fn minutes_for(word_count: usize, words_per_minute: NonZeroUsize) -> usize {
    word_count.div_ceil(words_per_minute.get()).max(1)
}

/// Counts words in plain text using the rule described in the module docs.
pub fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// Removes tags, comments and the contents of script-like elements.
///
/// Entities are decoded. Block-level element boundaries become whitespace so
/// `<p>one</p><p>two</p>` reads as two words, while inline elements such as
/// `<em>` do not split the word they sit in. Runs of whitespace in the result
/// are collapsed to a single space.
pub fn strip_markup(content: &str) -> String {
    let fragment = Html::parse_fragment(content);
    let mut text = String::with_capacity(content.len());

    for node in fragment.tree.root().descendants() {
        if node.prev_sibling().is_some_and(|sibling| breaks_words(sibling.value())) {
            text.push(' ');
        }
        match node.value() {
            Node::Element(_) if breaks_words(node.value()) => text.push(' '),
            Node::Text(chunk) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
                });
                if !hidden {
                    text.push_str(chunk);
                }
            }
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn breaks_words(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| !INLINE_ELEMENTS.contains(&el.name()))
}
