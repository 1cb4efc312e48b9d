use serde::{Deserialize, Serialize};

/// Title given to text that precedes the first heading.
pub const MAIN_SECTION: &str = "Main";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSection {
    pub title: String,
    pub content: String,
}

impl ArticleSection {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        ArticleSection {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn main(content: impl Into<String>) -> Self {
        Self::new(MAIN_SECTION, content)
    }

    pub fn is_main(&self) -> bool {
        self.title == MAIN_SECTION
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleArticle {
    pub title: String,
    pub sections: Vec<ArticleSection>,
}

impl SingleArticle {
    pub fn new(title: impl Into<String>, sections: Vec<ArticleSection>) -> Self {
        SingleArticle {
            title: title.into(),
            sections,
        }
    }

    /// Article holding `text` as its only, untitled section.
    pub fn from_text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(title, vec![ArticleSection::main(text)])
    }

    /// Flattened view of the article.
    ///
    /// A lone `"Main"` section is returned as-is; anything else is rendered
    /// back into `== title ==` headings joined by newlines.
    pub fn content(&self) -> String {
        if let [only] = self.sections.as_slice() {
            if only.is_main() {
                return only.content.clone();
            }
        }
        self.sections
            .iter()
            .map(|s| format!("== {} ==\n{}", s.title, s.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.sections.iter().map(|s| s.content.len()).sum()
    }

    /// One row per section, article title repeated.
    pub fn rows(&self) -> Vec<SectionRow> {
        self.sections
            .iter()
            .map(|s| SectionRow {
                article_title: self.title.clone(),
                section_title: s.title.clone(),
                section_content: s.content.clone(),
            })
            .collect()
    }
}

/// Tabular shape handed to storage collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRow {
    pub article_title: String,
    pub section_title: String,
    pub section_content: String,
}

pub fn total_chars(articles: &[SingleArticle]) -> usize {
    articles.iter().map(SingleArticle::char_len).sum()
}
