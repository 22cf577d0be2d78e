// src/generation/pptx.rs

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use super::GenerationError;

/// Extracts all text content from a PowerPoint file.
///
/// Slides are taken in deck order; each slide that yields any text becomes
/// a `--- Slide N ---` section with one trimmed line per paragraph. Slides
/// with nothing extractable are omitted entirely.
pub fn extract_text(path: &Path) -> Result<String, GenerationError> {
    let file = File::open(path).map_err(|source| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| GenerationError::SlideDeck {
        path: path.to_path_buf(),
        source,
    })?;

    let mut slide_entries: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| Some((slide_number(name)?, name.to_string())))
        .collect();
    slide_entries.sort_by_key(|(number, _)| *number);

    let mut sections = Vec::new();
    for (position, (_, name)) in slide_entries.iter().enumerate() {
        let mut xml = String::new();
        archive
            .by_name(name)
            .map_err(|source| GenerationError::SlideDeck {
                path: path.to_path_buf(),
                source,
            })?
            .read_to_string(&mut xml)
            .map_err(|source| GenerationError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let lines = slide_text_lines(&xml);
        if !lines.is_empty() {
            let mut section = vec![format!("--- Slide {} ---", position + 1)];
            section.extend(lines);
            sections.push(section.join("\n"));
        }
    }

    Ok(sections.join("\n\n"))
}

/// `ppt/slides/slide7.xml` -> `Some(7)`; anything else -> `None`.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Pulls the text of every `<a:p>` paragraph in a slide document, trimmed,
/// empty lines dropped. Table cells wrap their text in paragraphs too, so
/// this covers text shapes and tables alike, in document order.
fn slide_text_lines(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut lines = Vec::new();
    let mut in_paragraph = false;
    let mut in_text = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"a:p" => in_paragraph = true,
                b"a:t" if in_paragraph => in_text = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                current.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"a:p" => {
                    in_paragraph = false;
                    in_text = false;
                    let line = current.trim().to_string();
                    if !line.is_empty() {
                        lines.push(line);
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    lines
}
