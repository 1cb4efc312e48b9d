//! HTML layer: entities, line breaks and the tags wiki dumps wrap prose in.

use std::sync::LazyLock;

use regex::Regex;

use super::entities::unescape_html;
use super::rewrite::{fixed_point, DEFAULT_MAX_PASSES};
use super::tags::{remove_pairs, remove_self_closing, unwrap_pairs};
use crate::error::Result;

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

/// Tags whose content is kept.
const UNWRAPPED_TAGS: &[&str] = &["div", "h2", "span", "ref"];
/// Tags dropped along with everything inside them.
const REMOVED_TAGS: &[&str] = &["gallery"];

#[derive(Debug, Clone)]
pub struct HtmlProcessor {
    max_passes: usize,
}

impl Default for HtmlProcessor {
    fn default() -> Self {
        HtmlProcessor {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl HtmlProcessor {
    pub fn new(max_passes: usize) -> Self {
        HtmlProcessor { max_passes }
    }

    pub fn process(&self, text: &str) -> Result<String> {
        let text = fixed_point("html", text, self.max_passes, html_pass)?;
        Ok(text.trim().to_string())
    }
}

/// Strip the HTML layer of a wiki text blob.
pub fn process_wiki_html(text: &str) -> Result<String> {
    HtmlProcessor::default().process(text)
}

fn html_pass(text: &str) -> String {
    let text = text.replace("&nbsp;", " ");
    let mut text = unescape_html(&text).replace("<br />", "\n");

    for tag in UNWRAPPED_TAGS {
        text = unwrap_pairs(&text, tag);
    }
    for tag in REMOVED_TAGS {
        text = remove_pairs(&text, tag);
    }
    for tag in UNWRAPPED_TAGS.iter().chain(REMOVED_TAGS) {
        text = remove_self_closing(&text, tag);
    }

    let text = SPACES_RE.replace_all(&text, " ");
    NEWLINES_RE.replace_all(&text, "\n").into_owned()
}
