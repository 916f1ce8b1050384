use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zip::ZipArchive;

use super::{VocabularyItem, VocabularySource};
use crate::error::SourceError;

/// Separator Anki uses between the fields of a note.
const FIELD_SEPARATOR: char = '\u{1f}';

const GERMAN_FIELD: &str = "German";
const ENGLISH_FIELD: &str = "English";
const SENTENCE_FIELD: &str = "Sample sentence";
const AUDIO_FIELD: &str = "Audio";

/// Database entries of an `.apkg` package, newest format first.
const COLLECTION_ENTRIES: [&str; 2] = ["collection.anki21", "collection.anki2"];

#[derive(Debug, Deserialize)]
struct NoteModel {
    #[serde(default)]
    flds: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
struct FieldDef {
    name: String,
}

/// Reads notes from an Anki package (`.apkg`) or an extracted collection
/// (`collection.anki2`).
#[derive(Debug, Clone)]
pub struct AnkiCollectionSource {
    path: PathBuf,
}

/// An open collection. Packages are unpacked into a temp file that is
/// removed after the connection closes.
struct OpenCollection {
    conn: Connection,
    _unpacked: Option<NamedTempFile>,
}

fn is_package(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("apkg"))
}

/// Copies the collection database out of an `.apkg` zip.
fn unpack(package: &Path) -> Result<NamedTempFile, SourceError> {
    let mut archive = ZipArchive::new(File::open(package)?)?;
    let name = COLLECTION_ENTRIES
        .into_iter()
        .find(|name| archive.file_names().any(|entry| entry == *name))
        .ok_or_else(|| SourceError::MissingCollection(package.to_path_buf()))?;

    let mut entry = archive.by_name(name)?;
    let mut unpacked = NamedTempFile::new()?;
    io::copy(&mut entry, &mut unpacked)?;
    debug!(package = %package.display(), entry = name, "unpacked anki package");
    Ok(unpacked)
}

impl AnkiCollectionSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self) -> Result<OpenCollection, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::Transport(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", self.path.display()),
            )));
        }

        let unpacked = if is_package(&self.path) {
            Some(unpack(&self.path)?)
        } else {
            None
        };
        let db = unpacked.as_ref().map_or(self.path.as_path(), NamedTempFile::path);
        let conn = Connection::open_with_flags(db, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        Ok(OpenCollection {
            conn,
            _unpacked: unpacked,
        })
    }

    /// Field names per note type, keyed by model id.
    fn models(conn: &Connection) -> Result<HashMap<i64, Vec<String>>, SourceError> {
        let raw: String = conn.query_row("SELECT models FROM col LIMIT 1", [], |row| row.get(0))?;
        let models: HashMap<String, NoteModel> = serde_json::from_str(&raw)?;

        Ok(models
            .into_iter()
            .filter_map(|(id, model)| {
                let id = id.parse::<i64>().ok()?;
                Some((id, model.flds.into_iter().map(|f| f.name).collect()))
            })
            .collect())
    }
}

fn note_to_item(field_names: &[String], flds: &str) -> VocabularyItem {
    let fields: HashMap<&str, &str> = field_names
        .iter()
        .map(String::as_str)
        .zip(flds.split(FIELD_SEPARATOR))
        .collect();
    let field = |name: &str| fields.get(name).copied().unwrap_or_default();

    VocabularyItem::new(field(GERMAN_FIELD), field(ENGLISH_FIELD))
        .with_sentence(field(SENTENCE_FIELD))
        .with_audio(field(AUDIO_FIELD))
}

impl VocabularySource for AnkiCollectionSource {
    fn fetch(&mut self, count: usize) -> Result<Vec<VocabularyItem>, SourceError> {
        let collection = self.open()?;
        let conn = &collection.conn;
        let models = Self::models(conn)?;

        let mut stmt = conn.prepare("SELECT mid, flds FROM notes ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        let mut items = Vec::new();
        for row in rows {
            if items.len() >= count {
                break;
            }
            let (model_id, flds) = row?;
            match models.get(&model_id) {
                Some(field_names) => items.push(note_to_item(field_names, &flds)),
                None => warn!(model_id, "skipping note with unknown note type"),
            }
        }

        debug!(path = %self.path.display(), fetched = items.len(), count, "read anki collection");
        Ok(items)
    }
}
