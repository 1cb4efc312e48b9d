//! Wiki markup layer: links, templates, tables, lists and emphasis.
//!
//! Each pass resolves the innermost level of every nested construct, so the
//! pass runs to a fixed point.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::rewrite::{fixed_point, DEFAULT_MAX_PASSES};
use super::tags::rewrite_pairs;
use crate::error::Result;

/// Link namespaces removed outright unless configured otherwise.
pub const DEFAULT_HIDDEN_NAMESPACES: &[&str] = &["Plik", "Kategoria", "File"];

static PIPED_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\[\]]+\|([^\[\]]+)\]\]").unwrap());
static SIMPLE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\[\]]*)\]\]").unwrap());
// Body may not contain another `{{`.
static TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(?:[^{]|\{[^{])*?\}\}").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\|[^{]*?\|\}").unwrap());
static EXTERNAL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[https?://[^\s\]]*(?:[ \t]+([^\]\n]*))?\]").unwrap());
static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)([*#]+)").unwrap());
static DASH_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*-+[ \t]*$").unwrap());
static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(?:NOTOC|NOEDITSECTION|FORCETOC|TOC)__").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

static DEFAULT_PROCESSOR: LazyLock<MarkdownProcessor> = LazyLock::new(|| {
    MarkdownProcessor::new(DEFAULT_HIDDEN_NAMESPACES, DEFAULT_MAX_PASSES).unwrap()
});

#[derive(Debug, Clone)]
struct HiddenLinks {
    /// Whole `[[NS:...]]` link, or `[[:NS:...]]` without a display part.
    link: Regex,
    /// Link body starting with a hidden namespace.
    prefix: Regex,
}

impl HiddenLinks {
    fn new<S: AsRef<str>>(namespaces: &[S]) -> Result<Option<Self>> {
        let alternatives: Vec<String> = namespaces
            .iter()
            .map(|ns| ns.as_ref().trim())
            .filter(|ns| !ns.is_empty())
            .map(first_letter_insensitive)
            .collect();
        if alternatives.is_empty() {
            return Ok(None);
        }
        let ns = alternatives.join("|");
        let link = Regex::new(&format!(
            r"\[\[(?::(?:{ns}):[^\[\]|]*|(?:{ns}):(?:[^\[]|\[[^\[])*?)\]\]"
        ))?;
        let prefix = Regex::new(&format!(r"^:?(?:{ns}):"))?;
        Ok(Some(HiddenLinks { link, prefix }))
    }
}

/// MediaWiki treats the first letter of a namespace case-insensitively.
fn first_letter_insensitive(ns: &str) -> String {
    let mut chars = ns.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {
            let lower: String = first.to_lowercase().collect();
            let upper: String = first.to_uppercase().collect();
            format!(
                "[{}{}]{}",
                regex::escape(&upper),
                regex::escape(&lower),
                regex::escape(chars.as_str())
            )
        }
        _ => regex::escape(ns),
    }
}

#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
    hidden: Option<HiddenLinks>,
    max_passes: usize,
}

impl MarkdownProcessor {
    pub fn new<S: AsRef<str>>(hidden_namespaces: &[S], max_passes: usize) -> Result<Self> {
        Ok(MarkdownProcessor {
            hidden: HiddenLinks::new(hidden_namespaces)?,
            max_passes,
        })
    }

    pub fn process(&self, text: &str) -> Result<String> {
        let text = fixed_point("markdown", text, self.max_passes, |t| self.pass(t))?;
        Ok(text.trim().to_string())
    }

    fn pass(&self, text: &str) -> String {
        let mut text = text.to_string();
        if let Some(hidden) = &self.hidden {
            text = hidden.link.replace_all(&text, "").into_owned();
        }
        text = PIPED_LINK_RE.replace_all(&text, "$1").into_owned();
        text = SIMPLE_LINK_RE
            .replace_all(&text, |caps: &Captures| {
                let body = &caps[1];
                match &self.hidden {
                    // Exposed by an inner rewrite this pass; removed on the next one.
                    Some(hidden) if hidden.prefix.is_match(body) => caps[0].to_string(),
                    _ => body.to_string(),
                }
            })
            .into_owned();
        text = TEMPLATE_RE.replace_all(&text, "").into_owned();
        text = COMMENT_RE.replace_all(&text, "").into_owned();
        text = TABLE_RE.replace_all(&text, "").into_owned();
        text = rewrite_pairs(&text, "blockquote", |quote| format!("\n{quote}\n"));
        text = EXTERNAL_LINK_RE
            .replace_all(&text, |caps: &Captures| {
                caps.get(1).map(|label| label.as_str().trim().to_string()).unwrap_or_default()
            })
            .into_owned();
        text = LIST_MARKER_RE
            .replace_all(&text, |caps: &Captures| format!("{}{}", &caps[1], "-".repeat(caps[2].len())))
            .into_owned();
        text = DASH_LINE_RE.replace_all(&text, "").into_owned();
        text = text.replace("'''", "").replace("''", "");
        text = DIRECTIVE_RE.replace_all(&text, "").into_owned();
        text = SPACES_RE.replace_all(&text, " ").into_owned();
        NEWLINES_RE.replace_all(&text, "\n").into_owned()
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        DEFAULT_PROCESSOR.clone()
    }
}

/// Strip wiki markup using the default hidden namespaces.
pub fn process_wiki_markdown(text: &str) -> Result<String> {
    DEFAULT_PROCESSOR.process(text)
}
