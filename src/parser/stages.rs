use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::article::{total_chars, SingleArticle};
use crate::error::{Result, WikiError};

/// Pipeline stages in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Extracted,
    Html,
    Markdown,
    Sections,
    NonEmpty,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Extracted,
        Stage::Html,
        Stage::Markdown,
        Stage::Sections,
        Stage::NonEmpty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Extracted => "extracted",
            Stage::Html => "html",
            Stage::Markdown => "markdown",
            Stage::Sections => "sections",
            Stage::NonEmpty => "non_empty",
        }
    }

    /// Subdirectory of a dump target this stage writes into.
    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Extracted => "1_extracted_pages",
            Stage::Html => "2_processed_html_pages",
            Stage::Markdown => "3_processed_markdown_pages",
            Stage::Sections => "4_split_sections",
            Stage::NonEmpty => "5_non_empty_articles",
        }
    }
}

/// Where per-stage snapshots go: `<dir>/<stage dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DumpTarget {
    pub dir: PathBuf,
    pub name: String,
}

impl DumpTarget {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        DumpTarget {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn path_for(&self, stage: Stage) -> PathBuf {
        self.dir.join(stage.dir_name()).join(format!("{}.json", self.name))
    }

    pub fn write(&self, stage: Stage, articles: &[SingleArticle]) -> Result<PathBuf> {
        let path = self.path_for(stage);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| WikiError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(articles)?;
        fs::write(&path, json).map_err(|e| WikiError::io(&path, e))?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageMetric {
    pub stage: Stage,
    pub articles: usize,
    pub sections: usize,
    pub before: usize,
    pub after: usize,
}

/// Records article counts and text volume after each stage.
#[derive(Debug, Default)]
pub struct StageTracker {
    metrics: Vec<StageMetric>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, articles: &[SingleArticle], before: usize) {
        let after = total_chars(articles);
        let sections = articles.iter().map(|a| a.sections.len()).sum();
        info!(
            stage = stage.name(),
            articles = articles.len(),
            sections,
            chars = after,
            removed = before.saturating_sub(after),
            "stage done"
        );
        self.metrics.push(StageMetric {
            stage,
            articles: articles.len(),
            sections,
            before,
            after,
        });
    }

    pub fn metrics(&self) -> &[StageMetric] {
        &self.metrics
    }
}
