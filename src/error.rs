use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WikiError>;

#[derive(Debug, Error)]
pub enum WikiError {
    /// A `<page>` lacks one of the elements every dump page must carry.
    #[error("page #{index}{}: missing <{element}> element", describe_title(.title))]
    MissingElement {
        index: usize,
        title: Option<String>,
        element: &'static str,
    },

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A rewrite pass kept changing the text past the pass cap.
    #[error("{stage} did not converge after {passes} passes")]
    NotConverged { stage: &'static str, passes: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize stage dump: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid hidden namespace pattern: {0}")]
    InvalidNamespace(#[from] regex::Error),
}

fn describe_title(title: &Option<String>) -> String {
    match title {
        Some(t) => format!(" ({t})"),
        None => String::new(),
    }
}

impl WikiError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WikiError::Io {
            path: path.into(),
            source,
        }
    }
}
