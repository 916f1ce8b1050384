use thiserror::Error;

use crate::session::Phase;

/// Failures reported by a [`VocabularySource`](crate::vocabulary::VocabularySource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("could not read vocabulary: {0}")]
    Transport(#[from] std::io::Error),

    #[error("malformed vocabulary data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("anki collection error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("anki package could not be read: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("no collection database in anki package {}", .0.display())]
    MissingCollection(std::path::PathBuf),
    #[error("unknown deck '{0}'")]
    UnknownDeck(String),
}

/// Errors raised by the session engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Nothing to learn; the machine stays idle.
    #[error("no vocabulary words are available to start a session")]
    EmptyVocabulary,

    /// A command was issued in a phase that does not accept it.
    #[error("'{operation}' is not allowed in the {phase} phase")]
    InvalidStateTransition {
        operation: &'static str,
        phase: Phase,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
