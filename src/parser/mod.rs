pub mod entities;
pub mod html;
pub mod markdown;
pub mod rewrite;
pub mod sections;
pub mod stages;
pub mod tags;

use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use crate::article::{total_chars, ArticleSection, SingleArticle};
use crate::dump::{self, RawPage};
use crate::error::Result;
use crate::settings::Settings;
use html::HtmlProcessor;
use markdown::MarkdownProcessor;
use stages::{DumpTarget, Stage, StageMetric, StageTracker};

/// Five-stage pipeline: extracted → html → markdown → sections → non-empty.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    html: HtmlProcessor,
    markdown: MarkdownProcessor,
    dump: Option<DumpTarget>,
}

impl Pipeline {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Pipeline {
            html: HtmlProcessor::new(settings.max_passes),
            markdown: MarkdownProcessor::new(&settings.hidden_namespaces, settings.max_passes)?,
            dump: None,
        })
    }

    /// Snapshot every stage's output under `target`.
    pub fn with_dump(mut self, target: DumpTarget) -> Self {
        self.dump = Some(target);
        self
    }

    pub fn extract(&self, xml: &str) -> Result<Vec<SingleArticle>> {
        self.run(dump::read_pages_from_str(xml)?)
    }

    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Vec<SingleArticle>> {
        self.run(dump::read_pages_from_file(path)?)
    }

    pub fn run(&self, pages: Vec<RawPage>) -> Result<Vec<SingleArticle>> {
        self.run_observed(pages, |_| {})
    }

    /// Run every stage in order, handing each stage's metric to `on_stage`.
    pub fn run_observed<F>(&self, pages: Vec<RawPage>, mut on_stage: F) -> Result<Vec<SingleArticle>>
    where
        F: FnMut(&StageMetric),
    {
        let mut tracker = StageTracker::new();
        let mut articles: Vec<SingleArticle> = pages
            .into_iter()
            .map(|p| SingleArticle::from_text(p.title, p.text))
            .collect();

        for stage in Stage::ALL {
            let before = total_chars(&articles);
            articles = self.apply(stage, articles)?;
            tracker.record(stage, &articles, before);
            if let Some(target) = &self.dump {
                let path = target.write(stage, &articles)?;
                debug!(stage = stage.name(), path = %path.display(), "stage dumped");
            }
            if let Some(metric) = tracker.metrics().last() {
                on_stage(metric);
            }
        }

        Ok(articles)
    }

    fn apply(&self, stage: Stage, articles: Vec<SingleArticle>) -> Result<Vec<SingleArticle>> {
        match stage {
            Stage::Extracted => Ok(articles),
            Stage::Html => map_sections(articles, |t| self.html.process(t)),
            Stage::Markdown => map_sections(articles, |t| self.markdown.process(t)),
            Stage::Sections => Ok(articles.into_par_iter().map(split_article).collect()),
            Stage::NonEmpty => Ok(drop_empty(articles)),
        }
    }

    /// HTML layer then markdown layer on a single text.
    pub fn convert(&self, text: &str) -> Result<String> {
        self.markdown.process(&self.html.process(text)?)
    }
}

fn map_sections<F>(articles: Vec<SingleArticle>, process: F) -> Result<Vec<SingleArticle>>
where
    F: Fn(&str) -> Result<String> + Sync,
{
    articles
        .into_par_iter()
        .map(|article| {
            let sections = article
                .sections
                .iter()
                .map(|s| Ok(ArticleSection::new(s.title.clone(), process(&s.content)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(SingleArticle::new(article.title, sections))
        })
        .collect()
}

/// Re-split the flattened article on its `== heading ==` lines.
fn split_article(article: SingleArticle) -> SingleArticle {
    let sections = sections::split_wiki_text_by_sections(&article.content());
    SingleArticle::new(article.title, sections)
}

fn drop_empty(articles: Vec<SingleArticle>) -> Vec<SingleArticle> {
    articles
        .into_iter()
        .filter_map(|mut article| {
            article.sections.retain(|s| !s.content.trim().is_empty());
            if article.is_empty() {
                debug!(title = %article.title, "article empty after processing");
                return None;
            }
            Some(article)
        })
        .collect()
}

/// Extract plain-text articles from a MediaWiki XML export.
pub fn extract_articles(xml: &str) -> Result<Vec<SingleArticle>> {
    Pipeline::default().extract(xml)
}

pub fn extract_articles_from_file(path: impl AsRef<Path>) -> Result<Vec<SingleArticle>> {
    Pipeline::default().extract_file(path)
}

/// Strip both markup layers from raw wikitext.
pub fn convert_wiki_text(text: &str) -> Result<String> {
    Pipeline::default().convert(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WikiError;

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    }

    fn wiki_xml(pages: &[(&str, &str)]) -> String {
        let mut xml = String::from("<mediawiki>\n");
        for (title, text) in pages {
            xml.push_str(&format!(
                "<page>\n  <title>{}</title>\n  <revision>\n    <id>53701990</id>\n    <text bytes=\"7843\">{}</text>\n  </revision>\n</page>\n",
                escape(title),
                escape(text)
            ));
        }
        xml.push_str("</mediawiki>");
        xml
    }

    #[test]
    fn simple_pages() {
        let xml = wiki_xml(&[("Test", "Test text"), ("Test2", "Test text 2")]);
        let articles = extract_articles(&xml).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Test");
        assert_eq!(articles[0].content(), "Test text");
        assert_eq!(articles[1].title, "Test2");
        assert_eq!(articles[1].content(), "Test text 2");
    }

    #[test]
    fn category_link_end_to_end() {
        let xml = wiki_xml(&[("Test", "Test [[Kategoria:x]] text")]);
        let articles = extract_articles(&xml).unwrap();
        assert_eq!(
            articles,
            vec![SingleArticle::new("Test", vec![ArticleSection::main("Test text")])]
        );
    }

    #[test]
    fn html_and_markdown_layers() {
        let xml = wiki_xml(&[
            ("Test", "Test <div>Test1 text1</div> text"),
            ("Test2", "Test [[Kategoria:to [[remove]]]]text 2"),
        ]);
        let articles = extract_articles(&xml).unwrap();
        assert_eq!(articles[0].content(), "Test Test1 text1 text");
        assert_eq!(articles[1].content(), "Test text 2");
    }

    #[test]
    fn headings_become_sections() {
        let xml = wiki_xml(&[
            ("Test", "Test text\n==Section 1==\nSection 1 text\n==Section 2==\nSection 2 text"),
            ("Test2", "Test text 2"),
        ]);
        let articles = extract_articles(&xml).unwrap();
        let titles: Vec<_> = articles[0].sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Main", "Section 1", "Section 2"]);
        assert_eq!(articles[0].sections[2].content, "Section 2 text");
        assert_eq!(articles[1].sections, vec![ArticleSection::main("Test text 2")]);
    }

    #[test]
    fn empty_articles_excluded() {
        let xml = wiki_xml(&[
            ("Pusta", "{{Ujednoznacznienie}}\n[[Kategoria:Strony]]"),
            ("Test2", "Test text 2"),
            ("Tylko nagłówki", "== Bibliografia ==\n== Linki ==\n"),
        ]);
        let articles = extract_articles(&xml).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Test2");
    }

    #[test]
    fn order_matches_input() {
        let pages: Vec<(String, String)> = (0..200)
            .map(|i| (format!("Strona {i}"), format!("Tekst '''{i}''' [[a|b]]")))
            .collect();
        let refs: Vec<(&str, &str)> = pages.iter().map(|(t, b)| (t.as_str(), b.as_str())).collect();
        let articles = extract_articles(&wiki_xml(&refs)).unwrap();
        assert_eq!(articles.len(), 200);
        for (i, a) in articles.iter().enumerate() {
            assert_eq!(a.title, format!("Strona {i}"));
            assert_eq!(a.content(), format!("Tekst {i} b"));
        }
    }

    #[test]
    fn missing_text_fails_whole_document() {
        let xml = "<mediawiki><page><title>A</title><revision><text>a</text></revision></page>\
                   <page><title>B</title></page></mediawiki>";
        assert!(matches!(extract_articles(xml), Err(WikiError::MissingElement { index: 2, .. })));
    }

    #[test]
    fn stage_dumps_written() {
        let tmp = tempfile::tempdir().unwrap();
        let xml = wiki_xml(&[("Test", "Test text"), ("Test2", "Test text 2")]);
        let pipeline = Pipeline::default().with_dump(DumpTarget::new(tmp.path(), "test"));
        pipeline.extract(&xml).unwrap();
        for stage in Stage::ALL {
            assert!(tmp.path().join(stage.dir_name()).join("test.json").exists(), "{stage:?}");
        }
    }

    #[test]
    fn observer_sees_every_stage() {
        let xml = wiki_xml(&[("Test", "<div>a</div>\n==H==\n")]);
        let mut seen = Vec::new();
        Pipeline::default()
            .run_observed(dump::read_pages_from_str(&xml).unwrap(), |m| seen.push((m.stage, m.articles)))
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (Stage::Extracted, 1),
                (Stage::Html, 1),
                (Stage::Markdown, 1),
                (Stage::Sections, 1),
                (Stage::NonEmpty, 1),
            ]
        );
    }

    #[test]
    fn fixture_dump() {
        let articles = extract_articles_from_file("tests/fixtures/plwiki_sample.xml").unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Kraków", "Wisła (rzeka)"]);

        let krakow = &articles[0];
        let sections: Vec<_> = krakow.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(sections, ["Main", "Historia", "Zabytki"]);
        assert_eq!(
            krakow.sections[0].content,
            "Kraków – miasto na prawach powiatu w południowej Polsce, położone nad Wisłą."
        );
        assert_eq!(
            krakow.sections[1].content,
            "Pierwsze wzmianki o mieście pochodzą z 965 roku.\nW latach 1038–1596 był stolicą Polski."
        );
        assert_eq!(krakow.sections[2].content, "- Wawel\n- Sukiennice\n-- Galeria Sztuki Polskiej XIX wieku");

        let wisla = &articles[1];
        assert_eq!(wisla.sections, vec![ArticleSection::main("Wisła – najdłuższa rzeka w Polsce.")]);
    }

    #[test]
    fn convert_text() {
        assert_eq!(
            convert_wiki_text("'''Kraków''' <ref>Źródło</ref>&nbsp;[[Miasto|miasto]]").unwrap(),
            "Kraków Źródło miasto"
        );
    }
}
