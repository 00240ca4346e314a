use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

use crate::errors::{FileOperation, IoError};

#[derive(Debug, Error, Diagnostic)]
pub enum GamelistError {
    #[error("I/O error within gamelist domain")]
    #[diagnostic(code(resep::gamelist::io))]
    Io(#[from] IoError),

    #[error("gamelist is not well-formed XML")]
    #[diagnostic(
        code(resep::gamelist::parse),
        help("Run the gamelist through an XML validator")
    )]
    Parse {
        #[source]
        source: quick_xml::Error,
    },
}

/// One `<game>` element from a gamelist, flattened.
///
/// Every field is optional: an absent or empty sub-element becomes `None`,
/// never an empty string. Consumers decide which fields they require.
#[derive(Debug, Clone, Default)]
pub struct GameEntry {
    pub name: Option<String>,
    pub rom_path: Option<PathBuf>,
    pub boxart_path: Option<PathBuf>,
    pub marquee: Option<String>,
    pub description: Option<String>,
}

fn assign_field(entry: &mut GameEntry, tag: &str, text: String) {
    match tag {
        "name" => entry.name = Some(text),
        "path" => entry.rom_path = Some(PathBuf::from(text)),
        "thumbnail" => entry.boxart_path = Some(PathBuf::from(text)),
        "marquee" => entry.marquee = Some(text),
        "desc" => entry.description = Some(text),
        _ => {}
    }
}

/// Parse a gamelist, returning its `<game>` entries in document order.
pub fn parse_gamelist<R: BufRead>(reader: R) -> Result<Vec<GameEntry>, GamelistError> {
    let mut xml = Reader::from_reader(reader);

    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut current: Option<GameEntry> = None;
    let mut current_tag = String::new();

    loop {
        match xml
            .read_event_into(&mut buf)
            .map_err(|source| GamelistError::Parse { source })?
        {
            Event::Start(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag_name == "game" {
                    current = Some(GameEntry::default());
                } else if current.is_some() {
                    current_tag = tag_name;
                }
            }
            Event::Text(ref e) => {
                if let Some(ref mut entry) = current {
                    let text = e
                        .unescape()
                        .map_err(|source| GamelistError::Parse { source })?
                        .to_string();
                    assign_field(entry, &current_tag, text);
                }
            }
            // CDATA carries its content verbatim, nothing to unescape.
            Event::CData(e) => {
                if let Some(ref mut entry) = current {
                    let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                    assign_field(entry, &current_tag, text);
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"game" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                current_tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// Parse the gamelist at `path`.
///
/// A file that cannot be opened is an I/O error; a file that opens but does
/// not parse is a [`GamelistError::Parse`], which callers treat as "no games
/// to process" rather than a fatal fault.
pub fn read_gamelist(path: &Path) -> Result<Vec<GameEntry>, GamelistError> {
    let file = File::open(path)
        .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;
    parse_gamelist(BufReader::new(file))
}
