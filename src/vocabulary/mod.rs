pub mod anki;

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SourceError;

pub use anki::AnkiCollectionSource;

static DECK_DIR: Dir = include_dir!("src/decks");

/// Deck used when neither a file nor a deck name is configured.
pub const DEFAULT_DECK: &str = "german_basics";

/// One word to learn, as delivered by a vocabulary source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    #[serde(default, deserialize_with = "string_or_null")]
    pub german: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub english: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub sample_sentence: Option<String>,
    #[serde(default, alias = "audio", deserialize_with = "non_empty")]
    pub audio_ref: Option<String>,
}

impl VocabularyItem {
    pub fn new(german: impl Into<String>, english: impl Into<String>) -> Self {
        Self {
            german: german.into(),
            english: english.into(),
            sample_sentence: None,
            audio_ref: None,
        }
    }

    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sample_sentence = Some(sentence.into()).filter(|s: &String| !s.trim().is_empty());
        self
    }

    pub fn with_audio(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = Some(audio_ref.into()).filter(|s: &String| !s.trim().is_empty());
        self
    }
}

fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Supplies the words for a session.
///
/// Returns at most `count` items in deck order. Implementations never
/// schedule or shuffle; sessions pick their words with [`draw`].
pub trait VocabularySource {
    fn fetch(&mut self, count: usize) -> Result<Vec<VocabularyItem>, SourceError>;
}

impl VocabularySource for Vec<VocabularyItem> {
    fn fetch(&mut self, count: usize) -> Result<Vec<VocabularyItem>, SourceError> {
        Ok(self.iter().take(count).cloned().collect())
    }
}

impl<S: VocabularySource + ?Sized> VocabularySource for Box<S> {
    fn fetch(&mut self, count: usize) -> Result<Vec<VocabularyItem>, SourceError> {
        (**self).fetch(count)
    }
}

/// Picks `count` random words from everything `source` holds.
///
/// Sampling is without replacement and the picked words come back in random
/// order; all randomness is drawn from `rng`.
pub fn draw<S, R>(source: &mut S, count: usize, rng: &mut R) -> Result<Vec<VocabularyItem>, SourceError>
where
    S: VocabularySource + ?Sized,
    R: Rng + ?Sized,
{
    let pool = source.fetch(usize::MAX)?;
    let drawn: Vec<VocabularyItem> = pool.choose_multiple(rng, count).cloned().collect();
    debug!(available = pool.len(), drawn = drawn.len(), "drew session words");
    Ok(drawn)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deck {
    pub name: String,
    pub items: Vec<VocabularyItem>,
}

/// A deck file is either a named deck or a bare list of items.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeckFile {
    Named(Deck),
    Items(Vec<VocabularyItem>),
}

impl DeckFile {
    fn into_items(self) -> Vec<VocabularyItem> {
        match self {
            DeckFile::Named(deck) => deck.items,
            DeckFile::Items(items) => items,
        }
    }
}

/// Decks compiled into the binary from `src/decks`.
#[derive(Debug, Clone)]
pub struct BundledDeck {
    name: String,
}

impl BundledDeck {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of every bundled deck, sorted.
    pub fn available() -> Vec<String> {
        let mut names: Vec<String> = DECK_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn load(&self) -> Result<Deck, SourceError> {
        let file = DECK_DIR
            .get_file(format!("{}.json", self.name))
            .ok_or_else(|| SourceError::UnknownDeck(self.name.clone()))?;
        Ok(serde_json::from_slice(file.contents())?)
    }
}

impl Default for BundledDeck {
    fn default() -> Self {
        Self::new(DEFAULT_DECK)
    }
}

impl VocabularySource for BundledDeck {
    fn fetch(&mut self, count: usize) -> Result<Vec<VocabularyItem>, SourceError> {
        let deck = self.load()?;
        debug!(deck = %deck.name, available = deck.items.len(), count, "loaded bundled deck");
        Ok(deck.items.into_iter().take(count).collect())
    }
}

/// Reads a JSON deck from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl VocabularySource for JsonFileSource {
    fn fetch(&mut self, count: usize) -> Result<Vec<VocabularyItem>, SourceError> {
        let bytes = fs::read(&self.path)?;
        let items = serde_json::from_slice::<DeckFile>(&bytes)?.into_items();
        debug!(path = %self.path.display(), available = items.len(), count, "loaded deck file");
        Ok(items.into_iter().take(count).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{BTreeSet, HashSet};
    use tempfile::tempdir;

    #[test]
    fn deserializes_camel_case_with_audio_alias() {
        let json = r#"{
            "german": "der Hund",
            "english": "the dog",
            "sampleSentence": "Der Hund bellt.",
            "audio": "[sound:hund.mp3]"
        }"#;
        let item: VocabularyItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.german, "der Hund");
        assert_eq!(item.sample_sentence.as_deref(), Some("Der Hund bellt."));
        assert_eq!(item.audio_ref.as_deref(), Some("[sound:hund.mp3]"));
    }

    #[test]
    fn tolerates_missing_and_null_fields() {
        let item: VocabularyItem =
            serde_json::from_str(r#"{"german": null, "sampleSentence": ""}"#).unwrap();
        assert_eq!(item.german, "");
        assert_eq!(item.english, "");
        assert_eq!(item.sample_sentence, None);
        assert_eq!(item.audio_ref, None);
    }

    #[test]
    fn vec_source_takes_leading_items() {
        let mut words = vec![
            VocabularyItem::new("eins", "one"),
            VocabularyItem::new("zwei", "two"),
            VocabularyItem::new("drei", "three"),
        ];
        let fetched = words.fetch(2).unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[1].german, "zwei");
    }

    #[test]
    fn draw_samples_without_replacement() {
        let mut deck = BundledDeck::default();
        let drawn = draw(&mut deck, 5, &mut StdRng::seed_from_u64(3)).unwrap();
        let unique: HashSet<&str> = drawn.iter().map(|i| i.german.as_str()).collect();
        assert_eq!(unique.len(), 5);

        let again = draw(&mut deck, 5, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(drawn, again);

        let small = vec![VocabularyItem::new("eins", "one")];
        assert_eq!(draw(&mut small.clone(), 10, &mut StdRng::seed_from_u64(3)).unwrap(), small);
    }

    #[test]
    fn different_seeds_draw_different_words() {
        let words = |seed| {
            draw(&mut BundledDeck::default(), 5, &mut StdRng::seed_from_u64(seed))
                .unwrap()
                .into_iter()
                .map(|i| i.german)
                .collect::<BTreeSet<_>>()
        };
        let sets: HashSet<BTreeSet<String>> = (0..8).map(words).collect();
        assert!(sets.len() > 1);
    }

    #[test]
    fn default_bundled_deck_is_available() {
        assert!(BundledDeck::available().contains(&DEFAULT_DECK.to_string()));

        let deck = BundledDeck::default().load().unwrap();
        assert_eq!(deck.name, DEFAULT_DECK);
        assert!(deck.items.len() >= 10);
        assert!(deck.items.iter().all(|i| !i.german.is_empty()));
    }

    #[test]
    fn unknown_bundled_deck_is_an_error() {
        let result = BundledDeck::new("klingon").fetch(5);
        assert_matches!(result, Err(SourceError::UnknownDeck(name)) if name == "klingon");
    }

    #[test]
    fn json_file_accepts_bare_list_and_named_deck() {
        let dir = tempdir().unwrap();

        let list = dir.path().join("list.json");
        fs::write(&list, r#"[{"german": "die Katze", "english": "the cat"}]"#).unwrap();
        let items = JsonFileSource::new(&list).fetch(10).unwrap();
        assert_eq!(items, vec![VocabularyItem::new("die Katze", "the cat")]);

        let named = dir.path().join("named.json");
        fs::write(
            &named,
            r#"{"name": "tiere", "items": [{"german": "die Maus", "english": "the mouse"}]}"#,
        )
        .unwrap();
        let items = JsonFileSource::new(&named).fetch(10).unwrap();
        assert_eq!(items[0].german, "die Maus");
    }

    #[test]
    fn json_file_errors_map_to_source_errors() {
        let dir = tempdir().unwrap();
        let missing = JsonFileSource::new(dir.path().join("nope.json")).fetch(1);
        assert_matches!(missing, Err(SourceError::Transport(_)));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        assert_matches!(
            JsonFileSource::new(&garbage).fetch(1),
            Err(SourceError::Malformed(_))
        );
    }
}
