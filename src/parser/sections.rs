use std::sync::LazyLock;

use regex::Regex;

use crate::article::ArticleSection;

/// `== Title ==` on its own line; any run of two or more `=` on either side.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*={2,}[ \t]*([^=\n]*[^=\s][^=\n]*?)[ \t]*={2,}[ \t]*$").unwrap()
});

/// Split flat text into titled sections in document order.
///
/// Text before the first heading becomes the `"Main"` section. Sections whose
/// body is empty after trimming are dropped.
pub fn split_wiki_text_by_sections(text: &str) -> Vec<ArticleSection> {
    let headings: Vec<_> = HEADING_RE.captures_iter(text).collect();

    let Some(first) = headings.first() else {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![ArticleSection::main(trimmed)];
    };

    let mut sections = Vec::with_capacity(headings.len() + 1);

    let lead = text[..first.get(0).map_or(0, |m| m.start())].trim();
    if !lead.is_empty() {
        sections.push(ArticleSection::main(lead));
    }

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let body = text[whole.end()..end].trim();
        if body.is_empty() {
            continue;
        }
        sections.push(ArticleSection::new(title.as_str().trim(), body));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(sections: &[ArticleSection]) -> Vec<&str> {
        sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn no_headings() {
        let s = split_wiki_text_by_sections("plain text");
        assert_eq!(s, vec![ArticleSection::main("plain text")]);

        let s = split_wiki_text_by_sections("Section 1 text\nstill text\n        ");
        assert_eq!(s, vec![ArticleSection::main("Section 1 text\nstill text")]);
    }

    #[test]
    fn empty_text() {
        assert!(split_wiki_text_by_sections("").is_empty());
        assert!(split_wiki_text_by_sections(" \n\t ").is_empty());
    }

    #[test]
    fn lead_then_heading() {
        let s = split_wiki_text_by_sections("lead\n==H==\nbody");
        assert_eq!(
            s,
            vec![ArticleSection::main("lead"), ArticleSection::new("H", "body")]
        );
    }

    #[test]
    fn indented_headings() {
        let text = "== Section 1 ==\n        Section 1 text\n        == Section 2 ==\n        Section 2 text\n        ";
        let s = split_wiki_text_by_sections(text);
        assert_eq!(titles(&s), ["Section 1", "Section 2"]);
        assert_eq!(s[0].content, "Section 1 text");
        assert_eq!(s[1].content, "Section 2 text");
    }

    #[test]
    fn empty_section_dropped() {
        let s = split_wiki_text_by_sections("==H1==\nbody\n==H2==\n");
        assert_eq!(s, vec![ArticleSection::new("H1", "body")]);
    }

    #[test]
    fn asymmetric_and_deeper_markers() {
        let s = split_wiki_text_by_sections("===Sub===\na\n== Top ===\nb\n====  Deep  ====\nc");
        assert_eq!(titles(&s), ["Sub", "Top", "Deep"]);
        assert_eq!(s[2].content, "c");
    }

    #[test]
    fn inline_equals_are_not_headings() {
        let s = split_wiki_text_by_sections("a == b is true\n==H==\nx == y");
        assert_eq!(titles(&s), ["Main", "H"]);
        assert_eq!(s[0].content, "a == b is true");
        assert_eq!(s[1].content, "x == y");
    }

    #[test]
    fn heading_only_text_yields_nothing() {
        assert!(split_wiki_text_by_sections("==Bibliografia==\n==Linki zewnętrzne==").is_empty());
    }
}
