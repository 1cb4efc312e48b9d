//! Innermost-pair scanning for HTML-ish tags in wikitext.
//!
//! A pair `<tag ...>CONTENT</tag>` only matches when CONTENT holds no other
//! `<tag` opening. Outer pairs are left for a later pass, so repeated passes
//! peel nesting one level at a time.

/// Replace every innermost `<tag ...>CONTENT</tag>` with `replace(CONTENT)`.
pub fn rewrite_pairs<F>(text: &str, tag: &str, replace: F) -> String
where
    F: Fn(&str) -> String,
{
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    let mut search = 0;

    while let Some(rel) = text[search..].find(&open) {
        let start = search + rel;
        let after_name = start + open.len();
        search = after_name;

        let Some(gt) = text[after_name..].find('>') else {
            break;
        };
        let body_start = after_name + gt + 1;
        let Some(close_rel) = text[body_start..].find(&close) else {
            break;
        };
        let body_end = body_start + close_rel;
        let body = &text[body_start..body_end];
        if body.contains(&open) {
            continue;
        }

        out.push_str(&text[pos..start]);
        out.push_str(&replace(body));
        pos = body_end + close.len();
        search = pos;
    }

    out.push_str(&text[pos..]);
    out
}

/// Unwrap innermost pairs, keeping their content.
pub fn unwrap_pairs(text: &str, tag: &str) -> String {
    rewrite_pairs(text, tag, str::to_string)
}

/// Drop innermost pairs together with their content.
pub fn remove_pairs(text: &str, tag: &str) -> String {
    rewrite_pairs(text, tag, |_| String::new())
}

/// Drop self-closing `<tag .../>` markers.
pub fn remove_self_closing(text: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    let mut search = 0;

    while let Some(rel) = text[search..].find(&open) {
        let start = search + rel;
        let after_name = start + open.len();
        search = after_name;

        let Some(gt) = text[after_name..].find('>') else {
            break;
        };
        let end = after_name + gt;
        if !text[..end].ends_with('/') {
            continue;
        }

        out.push_str(&text[pos..start]);
        pos = end + 1;
        search = pos;
    }

    out.push_str(&text[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_with_attributes() {
        assert_eq!(unwrap_pairs(r#"a <div class="x">b</div> c"#, "div"), "a b c");
    }

    #[test]
    fn only_innermost_pair_per_pass() {
        let once = unwrap_pairs("<div>outer <div>inner</div></div>", "div");
        assert_eq!(once, "<div>outer inner</div>");
        assert_eq!(unwrap_pairs(&once, "div"), "outer inner");
    }

    #[test]
    fn sibling_pairs_in_one_pass() {
        assert_eq!(unwrap_pairs("<span>a</span> <span>b</span>", "span"), "a b");
    }

    #[test]
    fn unclosed_pair_left_alone() {
        assert_eq!(unwrap_pairs("a <div>b", "div"), "a <div>b");
    }

    #[test]
    fn removes_gallery_content() {
        assert_eq!(remove_pairs("a<gallery>\nx.jpg\ny.jpg\n</gallery>b", "gallery"), "ab");
    }

    #[test]
    fn drops_self_closing_only() {
        assert_eq!(remove_self_closing(r#"a <ref name="x"/> b <ref>c</ref>"#, "ref"), "a  b <ref>c</ref>");
        assert_eq!(remove_self_closing("a <references /> b", "ref"), "a  b");
    }
}
