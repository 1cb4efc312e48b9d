//! MediaWiki export to plain-text articles.
//!
//! Pages run through an HTML layer, a wiki markup layer and a section
//! splitter; see [`Pipeline`].

pub mod article;
pub mod dump;
pub mod error;
pub mod parser;
pub mod settings;

pub use article::{ArticleSection, SectionRow, SingleArticle, MAIN_SECTION};
pub use dump::RawPage;
pub use error::{Result, WikiError};
pub use parser::html::process_wiki_html;
pub use parser::markdown::process_wiki_markdown;
pub use parser::sections::split_wiki_text_by_sections;
pub use parser::stages::{DumpTarget, Stage, StageMetric};
pub use parser::{convert_wiki_text, extract_articles, extract_articles_from_file, Pipeline};
pub use settings::Settings;
