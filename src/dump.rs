use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Result, WikiError};

/// Title and raw wikitext of one `<page>` in a MediaWiki export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub title: String,
    pub text: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Capture {
    Title,
    Text,
}

/// Parse every `<page>` of an export held in memory.
pub fn read_pages_from_str(xml: &str) -> Result<Vec<RawPage>> {
    read_pages(Reader::from_str(xml))
}

/// Stream every `<page>` of an export file.
pub fn read_pages_from_file(path: impl AsRef<Path>) -> Result<Vec<RawPage>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| WikiError::io(path, e))?;
    read_pages(Reader::from_reader(BufReader::new(file)))
}

/// Walk the export, collecting `page/title` and the first `page/revision/text`.
///
/// Other elements (`ns`, `id`, `contributor`, ...) are skipped. A page without
/// a title or a revision text aborts the whole read.
pub fn read_pages<R: BufRead>(mut reader: Reader<R>) -> Result<Vec<RawPage>> {
    let mut pages = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut capture: Option<Capture> = None;
    let mut chunk = String::new();
    let mut title: Option<String> = None;
    let mut text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"page" {
                    title = None;
                    text = None;
                }
                stack.push(name);
                capture = capture_for(&stack);
                chunk.clear();
            }
            Event::Empty(e) => {
                stack.push(e.local_name().as_ref().to_vec());
                match capture_for(&stack) {
                    Some(Capture::Title) if title.is_none() => title = Some(String::new()),
                    Some(Capture::Text) if text.is_none() => text = Some(String::new()),
                    _ => {}
                }
                stack.pop();
            }
            Event::Text(e) if capture.is_some() => {
                chunk.push_str(&e.unescape().map_err(quick_xml::Error::from)?);
            }
            Event::CData(e) if capture.is_some() => {
                chunk.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(e) => {
                match capture.take() {
                    Some(Capture::Title) if title.is_none() => title = Some(std::mem::take(&mut chunk)),
                    Some(Capture::Text) if text.is_none() => text = Some(std::mem::take(&mut chunk)),
                    _ => {}
                }
                if e.local_name().as_ref() == b"page" {
                    let index = pages.len() + 1;
                    let page = finish_page(index, title.take(), text.take())?;
                    debug!(index, title = %page.title, chars = page.text.len(), "page extracted");
                    pages.push(page);
                }
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(pages)
}

fn capture_for(stack: &[Vec<u8>]) -> Option<Capture> {
    let names: Vec<&[u8]> = stack.iter().rev().take(3).map(Vec::as_slice).collect();
    match names.as_slice() {
        [b"title", b"page", ..] => Some(Capture::Title),
        [b"text", b"revision", b"page"] => Some(Capture::Text),
        _ => None,
    }
}

fn finish_page(index: usize, title: Option<String>, text: Option<String>) -> Result<RawPage> {
    let Some(title) = title else {
        return Err(WikiError::MissingElement {
            index,
            title: None,
            element: "title",
        });
    };
    let title = title.trim().to_string();
    let Some(text) = text else {
        return Err(WikiError::MissingElement {
            index,
            title: Some(title),
            element: "text",
        });
    };
    Ok(RawPage {
        title,
        text: text.trim().to_string(),
    })
}
