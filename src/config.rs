use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::session::DEFAULT_WORD_COUNT;
use crate::vocabulary::{
    AnkiCollectionSource, BundledDeck, JsonFileSource, VocabularySource, DEFAULT_DECK,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub word_count: usize,
    pub deck: String,
    pub deck_path: Option<PathBuf>,
    pub anki_collection: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_count: DEFAULT_WORD_COUNT,
            deck: DEFAULT_DECK.to_string(),
            deck_path: None,
            anki_collection: None,
        }
    }
}

impl Config {
    /// Picks the vocabulary source: an Anki collection wins over a deck
    /// file, which wins over a bundled deck.
    pub fn vocabulary_source(&self) -> Box<dyn VocabularySource> {
        if let Some(ref path) = self.anki_collection {
            Box::new(AnkiCollectionSource::new(path))
        } else if let Some(ref path) = self.deck_path {
            Box::new(JsonFileSource::new(path))
        } else {
            Box::new(BundledDeck::new(self.deck.clone()))
        }
    }

    /// Human readable name of the configured source.
    pub fn source_label(&self) -> String {
        if let Some(ref path) = self.anki_collection {
            format!("anki: {}", path.display())
        } else if let Some(ref path) = self.deck_path {
            format!("file: {}", path.display())
        } else {
            format!("deck: {}", self.deck)
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("wortschatz_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
